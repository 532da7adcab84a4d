use num_bigint::BigInt;

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeErrorType {
    VariableNotDefined { name: String },
    FunctionNotDefined { name: String, arity: usize },
    UnexpectedType { expected: &'static str, got: &'static str },
    IncomparableValues { left: &'static str, right: &'static str },
    InvalidAssignmentTarget,
    IndexingNonList { got: &'static str },
    IndexOutOfBounds { index: BigInt, length: usize },
    DivisionByZero,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub error: RuntimeErrorType,
}

impl RuntimeError {
    pub fn new(error: RuntimeErrorType) -> Self {
        Self { error }
    }

    pub fn details(&self) -> String {
        match &self.error {
            RuntimeErrorType::VariableNotDefined { name } => {
                format!("Variable `{name}` is not defined")
            },
            RuntimeErrorType::FunctionNotDefined { name, arity } => {
                format!("Function `{name}/{arity}` is not defined")
            },
            RuntimeErrorType::UnexpectedType { expected, got } => {
                format!("Expected a {expected} value, got a {got} value")
            },
            RuntimeErrorType::IncomparableValues { left, right } => {
                format!("Cannot compare a {left} value with a {right} value")
            },
            RuntimeErrorType::InvalidAssignmentTarget => {
                "Cannot assign to anything but a variable or a list element".to_string()
            },
            RuntimeErrorType::IndexingNonList { got } => {
                format!("Cannot index into a {got} value")
            },
            RuntimeErrorType::IndexOutOfBounds { index, length } => {
                format!("Index {index} is out of bounds for a list of length {length}")
            },
            RuntimeErrorType::DivisionByZero => "Cannot divide by zero".to_string(),
        }
    }
}
