use crate::{
    environment::prelude::Type,
    parser::prelude::{
        BinaryOperator, Case, Expression, Function, Global, LiteralValue, Source, Statement,
    },
};

/// Renders the analyzed tree as a single Java compilation unit. The tree
/// must have been through the analyzer: resolved signatures and variable
/// types are read from the annotation slots.
pub fn generate(source: &Source) -> String {
    let mut generator = Generator::new();
    generator.source(source);

    generator.finish()
}

struct Generator {
    out: String,
    indent: usize,
}

impl Generator {
    fn new() -> Self {
        Self { out: String::new(), indent: 0 }
    }

    fn finish(self) -> String {
        self.out
    }

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn source(&mut self, source: &Source) {
        self.push("public class Main {");

        if !source.globals.is_empty() {
            self.newline();
            self.indent += 1;
            for global in &source.globals {
                self.newline();
                self.global(global);
            }
            self.indent -= 1;
        }

        self.newline();
        self.indent += 1;
        self.newline();
        self.push("public static void main(String[] args) {");
        self.indent += 1;
        self.newline();
        self.push("System.exit(new Main().main());");
        self.indent -= 1;
        self.newline();
        self.push("}");
        self.indent -= 1;

        for function in &source.functions {
            self.newline();
            self.indent += 1;
            self.newline();
            self.function(function);
            self.indent -= 1;
        }

        self.newline();
        self.newline();
        self.push("}");
    }

    fn global(&mut self, global: &Global) {
        if !global.mutable {
            self.push("final ");
        }

        self.push(java_type_name(&global.type_name));
        if matches!(global.value, Some(Expression::List(_))) {
            self.push("[]");
        }
        self.push(" ");
        self.push(&global.name);

        if let Some(value) = &global.value {
            self.push(" = ");
            self.expression(value);
        }

        self.push(";");
    }

    fn function(&mut self, function: &Function) {
        let signature = function
            .function
            .get()
            .expect("function signature is resolved during analysis");

        self.push(java_type(signature.return_type));
        self.push(" ");
        self.push(&function.name);
        self.push("(");

        let parameters = function.parameters.iter().zip(&function.parameter_type_names);
        for (index, (name, type_name)) in parameters.enumerate() {
            if index > 0 {
                self.push(", ");
            }
            self.push(java_type_name(type_name));
            self.push(" ");
            self.push(name);
        }

        self.push(") {");
        self.indent += 1;
        for statement in &function.body {
            self.newline();
            self.statement(statement);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Expression(statement) => {
                self.expression(&statement.expression);
                self.push(";");
            },
            Statement::Declaration(statement) => {
                let variable = statement
                    .variable
                    .get()
                    .expect("declaration is resolved during analysis");

                self.push(java_type(variable.value_type));
                self.push(" ");
                self.push(&statement.name);

                if let Some(value) = &statement.value {
                    self.push(" = ");
                    self.expression(value);
                }

                self.push(";");
            },
            Statement::Assignment(statement) => {
                self.expression(&statement.receiver);
                self.push(" = ");
                self.expression(&statement.value);
                self.push(";");
            },
            Statement::If(statement) => {
                self.push("if (");
                self.expression(&statement.condition);
                self.push(") {");
                self.block(&statement.then_block);
                self.newline();
                self.push("}");

                if !statement.else_block.is_empty() {
                    self.push(" else {");
                    self.block(&statement.else_block);
                    self.newline();
                    self.push("}");
                }
            },
            Statement::Switch(statement) => {
                self.push("switch (");
                self.expression(&statement.subject);
                self.push(") {");
                self.indent += 1;
                for case in &statement.cases {
                    self.newline();
                    self.case(case);
                }
                self.indent -= 1;
                self.newline();
                self.push("}");
            },
            Statement::While(statement) => {
                self.push("while (");
                self.expression(&statement.condition);

                if statement.body.is_empty() {
                    self.push(") ;");
                } else {
                    self.push(") {");
                    self.block(&statement.body);
                    self.newline();
                    self.push("}");
                }
            },
            Statement::Return(statement) => {
                self.push("return ");
                self.expression(&statement.value);
                self.push(";");
            },
        }
    }

    fn block(&mut self, statements: &[Statement]) {
        self.indent += 1;
        for statement in statements {
            self.newline();
            self.statement(statement);
        }
        self.indent -= 1;
    }

    fn case(&mut self, case: &Case) {
        match &case.value {
            Some(value) => {
                self.push("case ");
                self.expression(value);
                self.push(":");
            },
            None => self.push("default:"),
        }

        self.indent += 1;
        for statement in &case.body {
            self.newline();
            self.statement(statement);
        }

        // Every non-default case falls out of the switch explicitly.
        if case.value.is_some() {
            self.newline();
            self.push("break;");
        }
        self.indent -= 1;
    }

    fn expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Literal(literal) => match &literal.value {
                LiteralValue::Nil => self.push("null"),
                LiteralValue::Boolean(value) => self.push(if *value { "true" } else { "false" }),
                LiteralValue::Integer(value) => self.push(&value.to_string()),
                LiteralValue::Decimal(value) => self.push(&value.to_string()),
                LiteralValue::Character(value) => {
                    self.out.push('\'');
                    self.out.push(*value);
                    self.out.push('\'');
                },
                LiteralValue::String(value) => {
                    self.out.push('"');
                    self.push(value);
                    self.out.push('"');
                },
            },
            Expression::Group(group) => {
                self.push("(");
                self.expression(&group.inner);
                self.push(")");
            },
            Expression::Binary(binary) => {
                // Java has no exponent operator.
                if binary.operator == BinaryOperator::Power {
                    self.push("Math.pow(");
                    self.expression(&binary.left);
                    self.push(", ");
                    self.expression(&binary.right);
                    self.push(")");
                } else {
                    self.expression(&binary.left);
                    self.push(&format!(" {} ", binary.operator));
                    self.expression(&binary.right);
                }
            },
            Expression::Access(access) => {
                self.push(&access.name);
                if let Some(offset) = &access.offset {
                    self.push("[");
                    self.expression(offset);
                    self.push("]");
                }
            },
            Expression::Call(call) => {
                let signature = call.function.get().expect("call is resolved during analysis");

                self.push(&signature.jvm_name);
                self.push("(");
                for (index, argument) in call.arguments.iter().enumerate() {
                    if index > 0 {
                        self.push(", ");
                    }
                    self.expression(argument);
                }
                self.push(")");
            },
            Expression::List(list) => {
                self.push("{");
                for (index, element) in list.elements.iter().enumerate() {
                    if index > 0 {
                        self.push(", ");
                    }
                    self.expression(element);
                }
                self.push("}");
            },
        }
    }
}

fn java_type_name(name: &str) -> &'static str {
    match name {
        "Character" => "char",
        "Boolean" => "boolean",
        "String" => "String",
        "Integer" => "int",
        "Decimal" => "double",
        _ => "void",
    }
}

fn java_type(value_type: Type) -> &'static str {
    match value_type {
        Type::Character => "char",
        Type::Boolean => "boolean",
        Type::String => "String",
        Type::Integer => "int",
        Type::Decimal => "double",
        Type::Nil | Type::Comparable | Type::Any => "void",
    }
}
