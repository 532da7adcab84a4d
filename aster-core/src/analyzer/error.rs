use crate::{
    environment::prelude::Type,
    parser::prelude::BinaryOperator,
    utils::prelude::SrcSpan,
};

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeError {
    /// A declared type name that is not part of the language.
    UnknownType {
        location: SrcSpan,
        name: String,
    },
    /// An integer literal that does not fit in 32 bits.
    IntegerOutOfRange {
        location: SrcSpan,
    },
    /// A decimal literal too large for a finite double.
    DecimalOutOfRange {
        location: SrcSpan,
    },
    /// A value stored into a slot it is not assignable to, a condition
    /// that is not a Boolean, or a case value that does not match its
    /// switch subject.
    TypeMismatch {
        location: SrcSpan,
        expected: Type,
        got: Type,
    },
    /// Operand types an operator does not accept.
    InvalidBinaryOperands {
        location: SrcSpan,
        operator: BinaryOperator,
        left: Type,
        right: Type,
    },
    /// Parentheses around anything but a binary expression.
    NonBinaryGroup {
        location: SrcSpan,
    },
    /// A declaration with neither a type annotation nor an initializer.
    MissingDeclarationType {
        location: SrcSpan,
        name: String,
    },
    /// Assignment into something that is not a variable access.
    InvalidAssignmentTarget {
        location: SrcSpan,
    },
    /// An expression statement that is not a call.
    InvalidExpressionStatement {
        location: SrcSpan,
    },
    /// An `IF` whose then-branch has no statements.
    EmptyThenBlock {
        location: SrcSpan,
    },
    /// A non-final case without a match value.
    MissingCaseValue {
        location: SrcSpan,
    },
    /// A final case that carries a match value instead of being the
    /// default.
    MissingDefaultCase {
        location: SrcSpan,
    },
    /// A `RETURN` whose value does not have the enclosing function's
    /// declared return type.
    ReturnTypeMismatch {
        location: SrcSpan,
        expected: Type,
        got: Type,
    },
    VariableNotDeclared {
        location: SrcSpan,
        name: String,
    },
    FunctionNotDeclared {
        location: SrcSpan,
        name: String,
        arity: usize,
    },
    /// No zero-parameter `main` function in the program.
    MissingMainFunction,
    /// `main/0` declared with a return type other than Integer.
    InvalidMainSignature {
        location: SrcSpan,
    },
}

impl AnalyzeError {
    pub fn location(&self) -> Option<SrcSpan> {
        match self {
            AnalyzeError::UnknownType { location, .. }
            | AnalyzeError::IntegerOutOfRange { location }
            | AnalyzeError::DecimalOutOfRange { location }
            | AnalyzeError::TypeMismatch { location, .. }
            | AnalyzeError::InvalidBinaryOperands { location, .. }
            | AnalyzeError::NonBinaryGroup { location }
            | AnalyzeError::MissingDeclarationType { location, .. }
            | AnalyzeError::InvalidAssignmentTarget { location }
            | AnalyzeError::InvalidExpressionStatement { location }
            | AnalyzeError::EmptyThenBlock { location }
            | AnalyzeError::MissingCaseValue { location }
            | AnalyzeError::MissingDefaultCase { location }
            | AnalyzeError::ReturnTypeMismatch { location, .. }
            | AnalyzeError::VariableNotDeclared { location, .. }
            | AnalyzeError::FunctionNotDeclared { location, .. }
            | AnalyzeError::InvalidMainSignature { location } => Some(*location),
            AnalyzeError::MissingMainFunction => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    UnreachableIfClause {
        location: SrcSpan,
    },
    UnreachableElseClause {
        location: SrcSpan,
    },
    UnreachableWhileBody {
        location: SrcSpan,
    },
    InfiniteLoop {
        location: SrcSpan,
    },
    UnreachableCode {
        location: SrcSpan,
    },
}

impl Warning {
    pub fn location(&self) -> SrcSpan {
        match self {
            Warning::UnreachableIfClause { location }
            | Warning::UnreachableElseClause { location }
            | Warning::UnreachableWhileBody { location }
            | Warning::InfiniteLoop { location }
            | Warning::UnreachableCode { location } => *location,
        }
    }
}
