pub mod error;

pub mod prelude {
    pub use super::{error::*, Flow, Interpreter};
}

#[cfg(test)]
mod tests;

use std::{cell::RefCell, cmp::Ordering, io::Write, rc::Rc};

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::{
    environment::prelude::{Callable, Closure, Scope, Value},
    parser::prelude::{
        Access, Assignment, Binary, BinaryOperator, Expression, LiteralValue, Source, Statement,
    },
};

use self::error::{RuntimeError, RuntimeErrorType};

/// Outcome of executing a statement: either control continues with the
/// next statement, or a `RETURN` is travelling to the active call.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Returning(Value),
}

pub struct Interpreter<W: Write> {
    out: W,
}

impl Interpreter<std::io::Stdout> {
    pub fn new() -> Self {
        Self { out: std::io::stdout() }
    }
}

impl Default for Interpreter<std::io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Self {
        Self { out }
    }

    /// Defines all globals and functions, then invokes `main/0` and
    /// returns its value. Runs on any parsed tree; the annotation slots
    /// are never read.
    pub fn interpret(&mut self, source: &Source) -> Result<Value, RuntimeError> {
        let scope = Scope::root();

        for global in &source.globals {
            let value = match &global.value {
                Some(value) => self.eval_expression(value, &scope)?,
                None => Value::Nil,
            };

            scope.borrow_mut().define(global.name.clone(), global.mutable, value);
        }

        for function in &source.functions {
            let closure = Closure {
                parameters: function.parameters.clone(),
                body: function.body.clone(),
                scope: scope.clone(),
            };

            scope.borrow_mut().define_callable(
                &function.name,
                function.parameters.len(),
                Callable::Closure(Rc::new(closure)),
            );
        }

        let main = scope.borrow().callable("main", 0).ok_or_else(|| {
            RuntimeError::new(RuntimeErrorType::FunctionNotDefined {
                name: "main".to_string(),
                arity: 0,
            })
        })?;

        self.call(&main, vec![])
    }

    fn call(&mut self, callable: &Callable, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        match callable {
            Callable::Print => {
                let value = arguments.into_iter().next().unwrap_or(Value::Nil);
                writeln!(self.out, "{value}").expect("interpreter output write");

                Ok(Value::Nil)
            },
            Callable::Closure(closure) => {
                let scope = Scope::child(&closure.scope);
                {
                    let mut scope = scope.borrow_mut();
                    for (name, value) in closure.parameters.iter().zip(arguments) {
                        scope.define(name.clone(), true, value);
                    }
                }

                match self.eval_block(&closure.body, &scope)? {
                    Flow::Returning(value) => Ok(value),
                    Flow::Normal => Ok(Value::Nil),
                }
            },
        }
    }

    fn eval_block(
        &mut self,
        statements: &[Statement],
        scope: &Rc<RefCell<Scope>>,
    ) -> Result<Flow, RuntimeError> {
        for statement in statements {
            match self.eval_statement(statement, scope)? {
                Flow::Normal => {},
                returning => return Ok(returning),
            }
        }

        Ok(Flow::Normal)
    }

    fn eval_statement(
        &mut self,
        statement: &Statement,
        scope: &Rc<RefCell<Scope>>,
    ) -> Result<Flow, RuntimeError> {
        match statement {
            Statement::Expression(statement) => {
                let _ = self.eval_expression(&statement.expression, scope)?;
                Ok(Flow::Normal)
            },
            Statement::Declaration(statement) => {
                let value = match &statement.value {
                    Some(value) => self.eval_expression(value, scope)?,
                    None => Value::Nil,
                };

                scope.borrow_mut().define(statement.name.clone(), true, value);
                Ok(Flow::Normal)
            },
            Statement::Assignment(statement) => {
                self.eval_assignment(statement, scope)?;
                Ok(Flow::Normal)
            },
            Statement::If(statement) => {
                let condition = require_boolean(self.eval_expression(&statement.condition, scope)?)?;
                let body = if condition { &statement.then_block } else { &statement.else_block };

                let child = Scope::child(scope);
                self.eval_block(body, &child)
            },
            Statement::Switch(statement) => {
                let subject = self.eval_expression(&statement.subject, scope)?;

                for case in &statement.cases {
                    let chosen = match &case.value {
                        Some(value) => self.eval_expression(value, scope)? == subject,
                        None => true,
                    };

                    if chosen {
                        let child = Scope::child(scope);
                        return self.eval_block(&case.body, &child);
                    }
                }

                Ok(Flow::Normal)
            },
            Statement::While(statement) => {
                loop {
                    let condition =
                        require_boolean(self.eval_expression(&statement.condition, scope)?)?;
                    if !condition {
                        break;
                    }

                    // Every iteration gets a fresh scope of its own.
                    let child = Scope::child(scope);
                    match self.eval_block(&statement.body, &child)? {
                        Flow::Normal => {},
                        returning => return Ok(returning),
                    }
                }

                Ok(Flow::Normal)
            },
            Statement::Return(statement) => {
                let value = self.eval_expression(&statement.value, scope)?;
                Ok(Flow::Returning(value))
            },
        }
    }

    fn eval_assignment(
        &mut self,
        statement: &Assignment,
        scope: &Rc<RefCell<Scope>>,
    ) -> Result<(), RuntimeError> {
        let Expression::Access(receiver) = &statement.receiver else {
            return Err(RuntimeError::new(RuntimeErrorType::InvalidAssignmentTarget));
        };

        match &receiver.offset {
            Some(offset) => {
                let target = scope.borrow().get(&receiver.name).ok_or_else(|| {
                    RuntimeError::new(RuntimeErrorType::VariableNotDefined {
                        name: receiver.name.clone(),
                    })
                })?;

                let elements = match target {
                    Value::List(elements) => elements,
                    other => {
                        return Err(RuntimeError::new(RuntimeErrorType::IndexingNonList {
                            got: other.type_name(),
                        }))
                    },
                };

                let index = require_integer(self.eval_expression(offset, scope)?)?;
                let value = self.eval_expression(&statement.value, scope)?;

                let mut elements = elements.borrow_mut();
                let length = elements.len();
                let slot = index
                    .to_usize()
                    .and_then(|index| elements.get_mut(index))
                    .ok_or_else(|| {
                        RuntimeError::new(RuntimeErrorType::IndexOutOfBounds {
                            index: index.clone(),
                            length,
                        })
                    })?;

                *slot = value;
            },
            None => {
                // Plain assignment does not consult the mutability flag.
                let value = self.eval_expression(&statement.value, scope)?;
                if !scope.borrow_mut().assign(&receiver.name, value) {
                    return Err(RuntimeError::new(RuntimeErrorType::VariableNotDefined {
                        name: receiver.name.clone(),
                    }));
                }
            },
        }

        Ok(())
    }

    fn eval_expression(
        &mut self,
        expression: &Expression,
        scope: &Rc<RefCell<Scope>>,
    ) -> Result<Value, RuntimeError> {
        match expression {
            Expression::Literal(literal) => Ok(match &literal.value {
                LiteralValue::Nil => Value::Nil,
                LiteralValue::Boolean(value) => Value::Boolean(*value),
                LiteralValue::Integer(value) => Value::Integer(value.clone()),
                LiteralValue::Decimal(value) => Value::Decimal(value.clone()),
                LiteralValue::Character(value) => Value::Character(*value),
                LiteralValue::String(value) => Value::String(value.clone()),
            }),
            Expression::Group(group) => self.eval_expression(&group.inner, scope),
            Expression::Binary(binary) => self.eval_binary(binary, scope),
            Expression::Access(access) => self.eval_access(access, scope),
            Expression::Call(call) => {
                let callable =
                    scope.borrow().callable(&call.name, call.arguments.len()).ok_or_else(|| {
                        RuntimeError::new(RuntimeErrorType::FunctionNotDefined {
                            name: call.name.clone(),
                            arity: call.arguments.len(),
                        })
                    })?;

                let mut arguments = Vec::with_capacity(call.arguments.len());
                for argument in &call.arguments {
                    arguments.push(self.eval_expression(argument, scope)?);
                }

                self.call(&callable, arguments)
            },
            Expression::List(list) => {
                let mut elements = Vec::with_capacity(list.elements.len());
                for element in &list.elements {
                    elements.push(self.eval_expression(element, scope)?);
                }

                Ok(Value::List(Rc::new(RefCell::new(elements))))
            },
        }
    }

    fn eval_access(
        &mut self,
        access: &Access,
        scope: &Rc<RefCell<Scope>>,
    ) -> Result<Value, RuntimeError> {
        let value = scope.borrow().get(&access.name).ok_or_else(|| {
            RuntimeError::new(RuntimeErrorType::VariableNotDefined { name: access.name.clone() })
        })?;

        let Some(offset) = &access.offset else {
            return Ok(value);
        };

        let elements = match value {
            Value::List(elements) => elements,
            other => {
                return Err(RuntimeError::new(RuntimeErrorType::IndexingNonList {
                    got: other.type_name(),
                }))
            },
        };

        let index = require_integer(self.eval_expression(offset, scope)?)?;
        let elements = elements.borrow();
        let length = elements.len();

        index
            .to_usize()
            .and_then(|index| elements.get(index))
            .cloned()
            .ok_or_else(|| RuntimeError::new(RuntimeErrorType::IndexOutOfBounds { index, length }))
    }

    fn eval_binary(
        &mut self,
        binary: &Binary,
        scope: &Rc<RefCell<Scope>>,
    ) -> Result<Value, RuntimeError> {
        match binary.operator {
            // Both operands are evaluated unconditionally; only `||`
            // short-circuits.
            BinaryOperator::And => {
                let left = require_boolean(self.eval_expression(&binary.left, scope)?)?;
                let right = require_boolean(self.eval_expression(&binary.right, scope)?)?;

                Ok(Value::Boolean(left && right))
            },
            BinaryOperator::Or => {
                if require_boolean(self.eval_expression(&binary.left, scope)?)? {
                    return Ok(Value::Boolean(true));
                }

                let right = require_boolean(self.eval_expression(&binary.right, scope)?)?;
                Ok(Value::Boolean(right))
            },
            BinaryOperator::LessThan => self.eval_comparison(binary, scope, Ordering::is_lt),
            BinaryOperator::GreaterThan => self.eval_comparison(binary, scope, Ordering::is_gt),
            BinaryOperator::Equal => {
                let left = self.eval_expression(&binary.left, scope)?;
                let right = self.eval_expression(&binary.right, scope)?;

                Ok(Value::Boolean(left == right))
            },
            BinaryOperator::NotEqual => {
                let left = self.eval_expression(&binary.left, scope)?;
                let right = self.eval_expression(&binary.right, scope)?;

                Ok(Value::Boolean(left != right))
            },
            BinaryOperator::Add => {
                let left = self.eval_expression(&binary.left, scope)?;
                let right = self.eval_expression(&binary.right, scope)?;

                match (left, right) {
                    (Value::String(left), right) => Ok(Value::String(format!("{left}{right}"))),
                    (left, Value::String(right)) => Ok(Value::String(format!("{left}{right}"))),
                    (Value::Integer(left), right) => {
                        Ok(Value::Integer(left + require_integer(right)?))
                    },
                    (Value::Decimal(left), right) => {
                        Ok(Value::Decimal(left + require_decimal(right)?))
                    },
                    (left, _) => Err(unexpected_number(left)),
                }
            },
            BinaryOperator::Subtract => {
                let left = self.eval_expression(&binary.left, scope)?;
                let right = self.eval_expression(&binary.right, scope)?;

                match (left, right) {
                    (Value::Integer(left), right) => {
                        Ok(Value::Integer(left - require_integer(right)?))
                    },
                    (Value::Decimal(left), right) => {
                        Ok(Value::Decimal(left - require_decimal(right)?))
                    },
                    (left, _) => Err(unexpected_number(left)),
                }
            },
            BinaryOperator::Multiply => {
                let left = self.eval_expression(&binary.left, scope)?;
                let right = self.eval_expression(&binary.right, scope)?;

                match (left, right) {
                    (Value::Integer(left), right) => {
                        Ok(Value::Integer(left * require_integer(right)?))
                    },
                    (Value::Decimal(left), right) => {
                        Ok(Value::Decimal(left * require_decimal(right)?))
                    },
                    (left, _) => Err(unexpected_number(left)),
                }
            },
            BinaryOperator::Divide => {
                let left = self.eval_expression(&binary.left, scope)?;
                let right = self.eval_expression(&binary.right, scope)?;

                match (left, right) {
                    (Value::Integer(left), right) => {
                        let right = require_integer(right)?;
                        if right.is_zero() {
                            return Err(RuntimeError::new(RuntimeErrorType::DivisionByZero));
                        }

                        Ok(Value::Integer(left / right))
                    },
                    (Value::Decimal(left), right) => {
                        let right = require_decimal(right)?;
                        if right.is_zero() {
                            return Err(RuntimeError::new(RuntimeErrorType::DivisionByZero));
                        }

                        // The quotient is rounded half-to-even at the
                        // dividend's scale.
                        let scale = left.fractional_digit_count();
                        Ok(Value::Decimal((left / right).with_scale_round(scale, RoundingMode::HalfEven)))
                    },
                    (left, _) => Err(unexpected_number(left)),
                }
            },
            // Iterative self-squaring: the accumulator starts at the left
            // operand and is squared once per decrement of the exponent.
            BinaryOperator::Power => {
                let mut accumulator = require_integer(self.eval_expression(&binary.left, scope)?)?;
                let mut exponent = require_integer(self.eval_expression(&binary.right, scope)?)?;

                while !exponent.is_zero() {
                    accumulator = &accumulator * &accumulator;
                    exponent = exponent - 1;
                }

                Ok(Value::Integer(accumulator))
            },
        }
    }

    fn eval_comparison(
        &mut self,
        binary: &Binary,
        scope: &Rc<RefCell<Scope>>,
        accept: fn(Ordering) -> bool,
    ) -> Result<Value, RuntimeError> {
        let left = self.eval_expression(&binary.left, scope)?;
        let right = self.eval_expression(&binary.right, scope)?;

        let ordering = match (&left, &right) {
            (Value::Integer(left), Value::Integer(right)) => left.cmp(right),
            (Value::Decimal(left), Value::Decimal(right)) => left.cmp(right),
            (Value::Character(left), Value::Character(right)) => left.cmp(right),
            (Value::String(left), Value::String(right)) => left.cmp(right),
            _ => {
                return Err(RuntimeError::new(RuntimeErrorType::IncomparableValues {
                    left: left.type_name(),
                    right: right.type_name(),
                }))
            },
        };

        Ok(Value::Boolean(accept(ordering)))
    }
}

fn require_boolean(value: Value) -> Result<bool, RuntimeError> {
    match value {
        Value::Boolean(value) => Ok(value),
        other => Err(RuntimeError::new(RuntimeErrorType::UnexpectedType {
            expected: "Boolean",
            got: other.type_name(),
        })),
    }
}

fn require_integer(value: Value) -> Result<BigInt, RuntimeError> {
    match value {
        Value::Integer(value) => Ok(value),
        other => Err(RuntimeError::new(RuntimeErrorType::UnexpectedType {
            expected: "Integer",
            got: other.type_name(),
        })),
    }
}

fn require_decimal(value: Value) -> Result<BigDecimal, RuntimeError> {
    match value {
        Value::Decimal(value) => Ok(value),
        other => Err(RuntimeError::new(RuntimeErrorType::UnexpectedType {
            expected: "Decimal",
            got: other.type_name(),
        })),
    }
}

fn unexpected_number(value: Value) -> RuntimeError {
    RuntimeError::new(RuntimeErrorType::UnexpectedType {
        expected: "Integer or Decimal",
        got: value.type_name(),
    })
}
