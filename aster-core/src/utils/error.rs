use std::path::PathBuf;

use termcolor::Buffer;
use thiserror::Error;

use crate::{
    analyzer::prelude::AnalyzeError,
    eval::prelude::RuntimeError,
    parser::prelude::ParseError,
};

use super::diagnostic::{Diagnostic, Label, Level, Location};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("failed to parse source code")]
    Parse {
        path: PathBuf,
        src: String,
        error: ParseError,
    },
    #[error("type checking failed")]
    Type {
        path: PathBuf,
        src: String,
        error: AnalyzeError,
    },
    #[error("program execution failed")]
    Runtime {
        error: RuntimeError,
    },
    #[error("IO operation failed")]
    StdIo {
        err: std::io::ErrorKind,
    },
}

impl Error {
    pub fn pretty_string(&self) -> String {
        let mut nocolor = Buffer::no_color();
        self.pretty(&mut nocolor);

        String::from_utf8(nocolor.into_inner()).expect("error printing produced invalid utf8")
    }

    pub fn pretty(&self, buf: &mut Buffer) {
        use std::io::Write;

        self.to_diagnostic().write(buf);
        writeln!(buf).expect("error buffer write");
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Parse { path, src, error } => {
                let (label, extra) = error.details();

                Diagnostic {
                    title: "Syntax error".to_string(),
                    text: extra.join("\n"),
                    hint: None,
                    level: Level::Error,
                    location: Some(Location {
                        src,
                        path: path.clone(),
                        label: Label {
                            text: Some(label.to_string()),
                            span: error.span,
                        },
                        extra_labels: vec![],
                    }),
                }
            },
            Error::Type { path, src, error } => {
                let (title, text, hint) = analyze_error_details(error);

                match error.location() {
                    Some(span) => Diagnostic {
                        title: title.to_string(),
                        text,
                        hint,
                        level: Level::Error,
                        location: Some(Location {
                            src,
                            path: path.clone(),
                            label: Label { text: None, span },
                            extra_labels: vec![],
                        }),
                    },
                    None => Diagnostic {
                        title: title.to_string(),
                        text,
                        hint,
                        level: Level::Error,
                        location: None,
                    },
                }
            },
            Error::Runtime { error } => Diagnostic {
                title: "Runtime error".to_string(),
                text: error.details(),
                hint: None,
                level: Level::Error,
                location: None,
            },
            Error::StdIo { err } => Diagnostic {
                title: "Standard IO error".to_string(),
                text: format!("{err}"),
                hint: None,
                level: Level::Error,
                location: None,
            },
        }
    }
}

fn analyze_error_details(error: &AnalyzeError) -> (&'static str, String, Option<String>) {
    match error {
        AnalyzeError::UnknownType { name, .. } => (
            "Unknown type",
            format!("`{name}` is not a type of this language"),
            None,
        ),
        AnalyzeError::IntegerOutOfRange { .. } => (
            "Integer out of range",
            "Integer literals must fit in 32 bits".to_string(),
            None,
        ),
        AnalyzeError::DecimalOutOfRange { .. } => (
            "Decimal out of range",
            "Decimal literals must fit in a finite double".to_string(),
            None,
        ),
        AnalyzeError::TypeMismatch { expected, got, .. } => (
            "Type mismatch",
            format!("Expected `{expected}`, but got `{got}`"),
            None,
        ),
        AnalyzeError::InvalidBinaryOperands { operator, left, right, .. } => (
            "Invalid operands",
            format!("`{operator}` cannot be applied to `{left}` and `{right}`"),
            None,
        ),
        AnalyzeError::NonBinaryGroup { .. } => (
            "Invalid parentheses",
            "Only binary expressions may be parenthesized".to_string(),
            None,
        ),
        AnalyzeError::MissingDeclarationType { name, .. } => (
            "Missing type",
            format!("`{name}` needs a type annotation or an initializer"),
            None,
        ),
        AnalyzeError::InvalidAssignmentTarget { .. } => (
            "Invalid assignment",
            "Only variables and list elements can be assigned to".to_string(),
            None,
        ),
        AnalyzeError::InvalidExpressionStatement { .. } => (
            "Invalid statement",
            "Only calls may stand alone as statements".to_string(),
            None,
        ),
        AnalyzeError::EmptyThenBlock { .. } => (
            "Empty branch",
            "An IF needs at least one statement in its then-branch".to_string(),
            None,
        ),
        AnalyzeError::MissingCaseValue { .. } => (
            "Missing case value",
            "Only the final DEFAULT case may omit its match value".to_string(),
            None,
        ),
        AnalyzeError::MissingDefaultCase { .. } => (
            "Missing default case",
            "The final case of a SWITCH must be the DEFAULT case".to_string(),
            None,
        ),
        AnalyzeError::ReturnTypeMismatch { expected, got, .. } => (
            "Return type mismatch",
            format!("The enclosing function returns `{expected}`, but this value is `{got}`"),
            None,
        ),
        AnalyzeError::VariableNotDeclared { name, .. } => (
            "Variable not declared",
            format!("`{name}` is not declared in this scope"),
            None,
        ),
        AnalyzeError::FunctionNotDeclared { name, arity, .. } => (
            "Function not declared",
            format!("`{name}/{arity}` is not declared"),
            None,
        ),
        AnalyzeError::MissingMainFunction => (
            "Missing main function",
            "Every program declares a zero-parameter `main`".to_string(),
            Some("FUN main ( ) : Integer DO ... END".to_string()),
        ),
        AnalyzeError::InvalidMainSignature { .. } => (
            "Invalid main function",
            "`main` must declare the `Integer` return type".to_string(),
            Some("FUN main ( ) : Integer DO ... END".to_string()),
        ),
    }
}
