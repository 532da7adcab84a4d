use crate::{
    lexer::prelude::{LexicalError, Token},
    utils::prelude::SrcSpan,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorType {
    UnexpectedToken {
        token: Token,
        expected: Vec<String>,
    },
    UnexpectedEof,
    ExpectedIdent,
    ExpectedType,
    MissingSemicolon,
    MissingDefaultCase,
    InvalidPrimaryExpression { token: Token },
    LexError { error: LexicalError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub error: ParseErrorType,
    pub span: SrcSpan,
}

impl ParseError {
    pub fn details(&self) -> (&'static str, Vec<String>) {
        match &self.error {
            ParseErrorType::UnexpectedToken { token, expected } => {
                let found = describe_token(token);

                let messages = std::iter::once(format!("Found {found}, expected one of:"))
                    .chain(expected.iter().map(|literal| format!("- `{literal}`")))
                    .collect();

                ("Unexpected token", messages)
            },
            ParseErrorType::UnexpectedEof => ("Unexpected end of file", vec![]),
            ParseErrorType::ExpectedIdent => ("Expected an identifier", vec![]),
            ParseErrorType::ExpectedType => ("Expected a type name", vec![]),
            ParseErrorType::MissingSemicolon => ("Missing semicolon", vec![]),
            ParseErrorType::MissingDefaultCase => {
                ("Missing default case", vec!["Every SWITCH ends with a DEFAULT case".into()])
            },
            ParseErrorType::InvalidPrimaryExpression { token } => {
                let found = describe_token(token);

                ("Invalid expression", vec![format!("Found {found}, expected an expression")])
            },
            ParseErrorType::LexError { error } => error.details(),
        }
    }
}

fn describe_token(token: &Token) -> String {
    match token {
        Token::Int(_) => "an integer literal".to_string(),
        Token::Decimal(_) => "a decimal literal".to_string(),
        Token::Char(_) => "a character literal".to_string(),
        Token::Str(_) => "a string literal".to_string(),
        Token::Ident(name) => format!("the identifier `{name}`"),
        token if token.is_keyword() => format!("the keyword `{}`", token.as_literal()),
        token => format!("`{}`", token.as_literal()),
    }
}

pub fn parse_error<T>(error: ParseErrorType, span: SrcSpan) -> Result<T, ParseError> {
    Err(ParseError { error, span })
}
