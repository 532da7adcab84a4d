use std::collections::HashMap;

use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;

use crate::{
    environment::prelude::{FunctionType, Type, Variable},
    parser::prelude::{
        Assignment, Binary, BinaryOperator, Declaration, Expression, ExpressionStatement,
        Function, Global, If, Literal, LiteralValue, Return, Source, Statement, Switch, While,
    },
    utils::prelude::{SrcSpan, TypeWarningEmitter},
};

use super::error::{AnalyzeError, Warning};

#[derive(Default)]
struct ScopeFrame {
    variables: HashMap<String, Variable>,
    functions: HashMap<(String, usize), FunctionType>,
}

pub struct ModuleAnalyzer<'a> {
    scopes: Vec<ScopeFrame>,
    function: Option<&'a Function>,
    warnings: Vec<Warning>,
}

impl<'a> ModuleAnalyzer<'a> {
    /// Runs the single analysis pass over `source`, filling the type and
    /// binding slots of every node it visits. Stops at the first error;
    /// warnings gathered up to that point are still emitted.
    pub fn analyze(source: &'a Source, warnings: &TypeWarningEmitter) -> Result<(), AnalyzeError> {
        let mut analyzer = ModuleAnalyzer {
            scopes: vec![ScopeFrame::default()],
            function: None,
            warnings: vec![],
        };

        analyzer.define_function(FunctionType {
            name: "print".to_string(),
            jvm_name: "System.out.println".to_string(),
            parameter_types: vec![Type::Any],
            return_type: Type::Nil,
        });

        let result = analyzer.analyze_source(source);

        analyzer.warnings.sort_by_key(|warning| warning.location().start);
        for warning in analyzer.warnings {
            warnings.emit(warning);
        }

        result
    }

    fn analyze_source(&mut self, source: &'a Source) -> Result<(), AnalyzeError> {
        for global in &source.globals {
            self.analyze_global(global)?;
        }

        let mut main_found = false;
        for function in &source.functions {
            if function.name == "main" && function.parameters.is_empty() {
                main_found = true;
                if function.return_type_name.as_deref() != Some("Integer") {
                    return Err(AnalyzeError::InvalidMainSignature { location: function.location });
                }
            }

            self.analyze_function(function)?;
        }

        if !main_found {
            return Err(AnalyzeError::MissingMainFunction);
        }

        Ok(())
    }

    fn analyze_global(&mut self, global: &Global) -> Result<(), AnalyzeError> {
        let declared = resolve_type(&global.type_name, global.location)?;

        if let Some(value) = &global.value {
            self.analyze_expression(value)?;

            match value {
                // An empty list has no element to take a type from; it
                // adopts the declared one.
                Expression::List(list) if list.elements.is_empty() => {
                    let _ = list.resolved_type.set(declared);
                },
                _ => require_assignable(declared, value.resolved_type(), value.location())?,
            }
        }

        let variable = Variable {
            name: global.name.clone(),
            value_type: declared,
            mutable: global.mutable,
        };
        self.define_variable(variable.clone());
        let _ = global.variable.set(variable);

        Ok(())
    }

    fn analyze_function(&mut self, function: &'a Function) -> Result<(), AnalyzeError> {
        let mut parameter_types = vec![];
        for type_name in &function.parameter_type_names {
            parameter_types.push(resolve_type(type_name, function.location)?);
        }

        let return_type = match &function.return_type_name {
            Some(type_name) => resolve_type(type_name, function.location)?,
            None => Type::Nil,
        };

        // Defined before the body is visited so the function can call
        // itself.
        let signature = FunctionType {
            name: function.name.clone(),
            jvm_name: function.name.clone(),
            parameter_types: parameter_types.clone(),
            return_type,
        };
        self.define_function(signature.clone());
        let _ = function.function.set(signature);

        let enclosing = self.function.replace(function);
        let result = self.in_child_scope(|this| {
            for (name, value_type) in function.parameters.iter().zip(&parameter_types) {
                this.define_variable(Variable {
                    name: name.clone(),
                    value_type: *value_type,
                    mutable: true,
                });
            }

            this.analyze_block(&function.body)
        });
        self.function = enclosing;

        result
    }

    fn analyze_block(&mut self, statements: &[Statement]) -> Result<(), AnalyzeError> {
        let mut unreachable_reported = false;

        for (index, statement) in statements.iter().enumerate() {
            self.analyze_statement(statement)?;

            if let Statement::Return(_) = statement {
                if index + 1 < statements.len() && !unreachable_reported {
                    unreachable_reported = true;
                    self.warnings.push(Warning::UnreachableCode {
                        location: SrcSpan {
                            start: statements[index + 1].location().start,
                            end: statements[statements.len() - 1].location().end,
                        },
                    });
                }
            }
        }

        Ok(())
    }

    fn analyze_statement(&mut self, statement: &Statement) -> Result<(), AnalyzeError> {
        match statement {
            Statement::Expression(statement) => self.analyze_expression_statement(statement),
            Statement::Declaration(statement) => self.analyze_declaration(statement),
            Statement::Assignment(statement) => self.analyze_assignment(statement),
            Statement::If(statement) => self.analyze_if(statement),
            Statement::Switch(statement) => self.analyze_switch(statement),
            Statement::While(statement) => self.analyze_while(statement),
            Statement::Return(statement) => self.analyze_return(statement),
        }
    }

    fn analyze_expression_statement(
        &mut self,
        statement: &ExpressionStatement,
    ) -> Result<(), AnalyzeError> {
        if !matches!(statement.expression, Expression::Call(_)) {
            return Err(AnalyzeError::InvalidExpressionStatement { location: statement.location });
        }

        self.analyze_expression(&statement.expression)
    }

    fn analyze_declaration(&mut self, statement: &Declaration) -> Result<(), AnalyzeError> {
        if let Some(value) = &statement.value {
            self.analyze_expression(value)?;
        }

        let declared = match &statement.type_name {
            Some(type_name) => Some(resolve_type(type_name, statement.location)?),
            None => None,
        };

        let value_type = match (declared, &statement.value) {
            (Some(declared), Some(value)) => {
                require_assignable(declared, value.resolved_type(), value.location())?;
                declared
            },
            (Some(declared), None) => declared,
            (None, Some(value)) => value.resolved_type(),
            (None, None) => {
                return Err(AnalyzeError::MissingDeclarationType {
                    location: statement.location,
                    name: statement.name.clone(),
                })
            },
        };

        let variable = Variable {
            name: statement.name.clone(),
            value_type,
            mutable: true,
        };
        self.define_variable(variable.clone());
        let _ = statement.variable.set(variable);

        Ok(())
    }

    fn analyze_assignment(&mut self, statement: &Assignment) -> Result<(), AnalyzeError> {
        if !matches!(statement.receiver, Expression::Access(_)) {
            return Err(AnalyzeError::InvalidAssignmentTarget {
                location: statement.receiver.location(),
            });
        }

        self.analyze_expression(&statement.receiver)?;
        self.analyze_expression(&statement.value)?;

        require_assignable(
            statement.receiver.resolved_type(),
            statement.value.resolved_type(),
            statement.value.location(),
        )
    }

    fn analyze_if(&mut self, statement: &If) -> Result<(), AnalyzeError> {
        self.analyze_expression(&statement.condition)?;
        require_boolean(&statement.condition)?;

        if statement.then_block.is_empty() {
            return Err(AnalyzeError::EmptyThenBlock { location: statement.location });
        }

        self.in_child_scope(|this| this.analyze_block(&statement.then_block))?;
        self.in_child_scope(|this| this.analyze_block(&statement.else_block))?;

        if let Expression::Literal(Literal { value: LiteralValue::Boolean(condition), .. }) =
            &statement.condition
        {
            match condition {
                true => {
                    if let Some(location) = block_location(&statement.else_block) {
                        self.warnings.push(Warning::UnreachableElseClause { location });
                    }
                },
                false => {
                    if let Some(location) = block_location(&statement.then_block) {
                        self.warnings.push(Warning::UnreachableIfClause { location });
                    }
                },
            }
        }

        Ok(())
    }

    fn analyze_switch(&mut self, statement: &Switch) -> Result<(), AnalyzeError> {
        self.analyze_expression(&statement.subject)?;
        let subject_type = statement.subject.resolved_type();

        let count = statement.cases.len();
        for (index, case) in statement.cases.iter().enumerate() {
            let last = index + 1 == count;

            match (&case.value, last) {
                (Some(_), true) => {
                    return Err(AnalyzeError::MissingDefaultCase { location: case.location })
                },
                (None, false) => {
                    return Err(AnalyzeError::MissingCaseValue { location: case.location })
                },
                (Some(value), false) => {
                    self.analyze_expression(value)?;
                    let value_type = value.resolved_type();
                    if value_type != subject_type {
                        return Err(AnalyzeError::TypeMismatch {
                            location: value.location(),
                            expected: subject_type,
                            got: value_type,
                        });
                    }
                },
                (None, true) => {},
            }

            self.in_child_scope(|this| this.analyze_block(&case.body))?;
        }

        Ok(())
    }

    fn analyze_while(&mut self, statement: &While) -> Result<(), AnalyzeError> {
        self.analyze_expression(&statement.condition)?;
        require_boolean(&statement.condition)?;

        self.in_child_scope(|this| this.analyze_block(&statement.body))?;

        if let Expression::Literal(Literal { value: LiteralValue::Boolean(condition), .. }) =
            &statement.condition
        {
            match condition {
                true => self.warnings.push(Warning::InfiniteLoop {
                    location: statement.condition.location(),
                }),
                false => {
                    if let Some(location) = block_location(&statement.body) {
                        self.warnings.push(Warning::UnreachableWhileBody { location });
                    }
                },
            }
        }

        Ok(())
    }

    fn analyze_return(&mut self, statement: &Return) -> Result<(), AnalyzeError> {
        self.analyze_expression(&statement.value)?;

        let function = self.function.expect("return statement inside a function body");
        let expected = function
            .function
            .get()
            .map(|signature| signature.return_type)
            .expect("enclosing function signature is resolved first");

        let got = statement.value.resolved_type();
        if got != expected {
            return Err(AnalyzeError::ReturnTypeMismatch {
                location: statement.value.location(),
                expected,
                got,
            });
        }

        Ok(())
    }

    fn analyze_expression(&mut self, expression: &Expression) -> Result<(), AnalyzeError> {
        match expression {
            Expression::Literal(literal) => {
                let value_type = literal_type(literal)?;
                let _ = literal.resolved_type.set(value_type);
                Ok(())
            },
            Expression::Group(group) => {
                if !matches!(*group.inner, Expression::Binary(_)) {
                    return Err(AnalyzeError::NonBinaryGroup { location: group.location });
                }

                self.analyze_expression(&group.inner)?;
                let _ = group.resolved_type.set(group.inner.resolved_type());
                Ok(())
            },
            Expression::Binary(binary) => self.analyze_binary(binary),
            Expression::Access(access) => {
                if let Some(offset) = &access.offset {
                    self.analyze_expression(offset)?;
                    let offset_type = offset.resolved_type();
                    if offset_type != Type::Integer {
                        return Err(AnalyzeError::TypeMismatch {
                            location: offset.location(),
                            expected: Type::Integer,
                            got: offset_type,
                        });
                    }
                }

                let variable = self.lookup_variable(&access.name).ok_or_else(|| {
                    AnalyzeError::VariableNotDeclared {
                        location: access.location,
                        name: access.name.clone(),
                    }
                })?;

                let _ = access.resolved_type.set(variable.value_type);
                let _ = access.variable.set(variable);
                Ok(())
            },
            Expression::Call(call) => {
                // The callee is resolved before the arguments, so an
                // unknown function surfaces first.
                let signature = self
                    .lookup_function(&call.name, call.arguments.len())
                    .ok_or_else(|| AnalyzeError::FunctionNotDeclared {
                        location: call.location,
                        name: call.name.clone(),
                        arity: call.arguments.len(),
                    })?;

                for (argument, parameter_type) in call.arguments.iter().zip(&signature.parameter_types) {
                    self.analyze_expression(argument)?;
                    require_assignable(*parameter_type, argument.resolved_type(), argument.location())?;
                }

                let _ = call.resolved_type.set(signature.return_type);
                let _ = call.function.set(signature);
                Ok(())
            },
            Expression::List(list) => {
                for element in &list.elements {
                    self.analyze_expression(element)?;
                    let element_type = element.resolved_type();

                    match list.resolved_type.get() {
                        None => {
                            let _ = list.resolved_type.set(element_type);
                        },
                        Some(expected) if *expected != element_type => {
                            return Err(AnalyzeError::TypeMismatch {
                                location: element.location(),
                                expected: *expected,
                                got: element_type,
                            });
                        },
                        Some(_) => {},
                    }
                }

                Ok(())
            },
        }
    }

    fn analyze_binary(&mut self, binary: &Binary) -> Result<(), AnalyzeError> {
        self.analyze_expression(&binary.left)?;
        self.analyze_expression(&binary.right)?;

        let left = binary.left.resolved_type();
        let right = binary.right.resolved_type();

        let mismatch = || AnalyzeError::InvalidBinaryOperands {
            location: binary.location,
            operator: binary.operator,
            left,
            right,
        };

        let value_type = match binary.operator {
            BinaryOperator::And | BinaryOperator::Or => {
                if left != Type::Boolean || right != Type::Boolean {
                    return Err(mismatch());
                }
                Type::Boolean
            },
            BinaryOperator::LessThan
            | BinaryOperator::GreaterThan
            | BinaryOperator::Equal
            | BinaryOperator::NotEqual => {
                if left != right || !left.is_comparable() {
                    return Err(mismatch());
                }
                Type::Boolean
            },
            BinaryOperator::Add => {
                if left == Type::String || right == Type::String {
                    Type::String
                } else if left != right || !matches!(left, Type::Integer | Type::Decimal) {
                    return Err(mismatch());
                } else {
                    left
                }
            },
            BinaryOperator::Subtract | BinaryOperator::Multiply | BinaryOperator::Divide => {
                if left != right || !matches!(left, Type::Integer | Type::Decimal) {
                    return Err(mismatch());
                }
                left
            },
            BinaryOperator::Power => {
                if left != Type::Integer || right != Type::Integer {
                    return Err(mismatch());
                }
                Type::Integer
            },
        };

        let _ = binary.resolved_type.set(value_type);
        Ok(())
    }

    fn in_child_scope<F, R>(&mut self, run: F) -> Result<R, AnalyzeError>
    where
        F: FnOnce(&mut Self) -> Result<R, AnalyzeError>,
    {
        self.scopes.push(ScopeFrame::default());
        let result = run(self);
        let _ = self.scopes.pop();

        result
    }

    fn define_variable(&mut self, variable: Variable) {
        let frame = self.scopes.last_mut().expect("at least one scope frame");
        frame.variables.insert(variable.name.clone(), variable);
    }

    fn define_function(&mut self, function: FunctionType) {
        let frame = self.scopes.last_mut().expect("at least one scope frame");
        frame
            .functions
            .insert((function.name.clone(), function.parameter_types.len()), function);
    }

    fn lookup_variable(&self, name: &str) -> Option<Variable> {
        self.scopes
            .iter()
            .rev()
            .find_map(|frame| frame.variables.get(name).cloned())
    }

    fn lookup_function(&self, name: &str, arity: usize) -> Option<FunctionType> {
        self.scopes
            .iter()
            .rev()
            .find_map(|frame| frame.functions.get(&(name.to_string(), arity)).cloned())
    }
}

/// Accepts storing a `source`-typed value into a `target`-typed slot:
/// `Any` accepts everything, `Comparable` accepts the four comparable
/// types, anything else requires an exact match.
pub fn require_assignable(target: Type, source: Type, location: SrcSpan) -> Result<(), AnalyzeError> {
    if target == Type::Any {
        return Ok(());
    }
    if target == Type::Comparable && source.is_comparable() {
        return Ok(());
    }
    if target == source {
        return Ok(());
    }

    Err(AnalyzeError::TypeMismatch { location, expected: target, got: source })
}

fn require_boolean(condition: &Expression) -> Result<(), AnalyzeError> {
    let condition_type = condition.resolved_type();
    if condition_type != Type::Boolean {
        return Err(AnalyzeError::TypeMismatch {
            location: condition.location(),
            expected: Type::Boolean,
            got: condition_type,
        });
    }

    Ok(())
}

fn resolve_type(name: &str, location: SrcSpan) -> Result<Type, AnalyzeError> {
    Type::from_name(name).ok_or_else(|| AnalyzeError::UnknownType {
        location,
        name: name.to_string(),
    })
}

fn literal_type(literal: &Literal) -> Result<Type, AnalyzeError> {
    match &literal.value {
        LiteralValue::Nil => Ok(Type::Nil),
        LiteralValue::Boolean(_) => Ok(Type::Boolean),
        LiteralValue::Integer(value) => {
            if bit_length(value) > 32 {
                return Err(AnalyzeError::IntegerOutOfRange { location: literal.location });
            }
            Ok(Type::Integer)
        },
        LiteralValue::Decimal(value) => {
            if value.to_f64().map_or(true, f64::is_infinite) {
                return Err(AnalyzeError::DecimalOutOfRange { location: literal.location });
            }
            Ok(Type::Decimal)
        },
        LiteralValue::Character(_) => Ok(Type::Character),
        LiteralValue::String(_) => Ok(Type::String),
    }
}

// The length of the minimal two's-complement representation, sign bit
// excluded; -1 has length 0 and -2^31 has length 31.
fn bit_length(value: &BigInt) -> u64 {
    match value.sign() {
        Sign::Minus => (value.clone() + 1i32).magnitude().bits(),
        _ => value.magnitude().bits(),
    }
}

fn block_location(statements: &[Statement]) -> Option<SrcSpan> {
    let first = statements.first()?;
    let last = statements.last()?;

    Some(SrcSpan {
        start: first.location().start,
        end: last.location().end,
    })
}
