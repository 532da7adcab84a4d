use crate::utils::prelude::SrcSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalErrorType {
    UnrecognizedCharacter { ch: char },
    UnterminatedCharacter,
    UnterminatedString,
    UnrecognizedEscape { ch: char },
    UnterminatedEscape,
    InvalidNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalError {
    pub error: LexicalErrorType,
    pub location: SrcSpan,
}

impl LexicalError {
    pub fn details(&self) -> (&'static str, Vec<String>) {
        match self.error {
            LexicalErrorType::UnrecognizedCharacter { ch } => {
                ("Unrecognized character", vec![format!("`{ch}` does not start any token")])
            },
            LexicalErrorType::UnterminatedCharacter => {
                ("Invalid character literal", vec!["Expected a closing single quote: `'`".into()])
            },
            LexicalErrorType::UnterminatedString => {
                ("Unterminated string literal", vec!["Expected a closing double quote: `\"`".into()])
            },
            LexicalErrorType::UnrecognizedEscape { ch } => {
                ("Unrecognized escape sequence", vec![format!("`\\{ch}` is not a valid escape")])
            },
            LexicalErrorType::UnterminatedEscape => {
                ("Unterminated escape sequence", vec!["Expected a character after `\\`".into()])
            },
            LexicalErrorType::InvalidNumber => {
                ("Invalid numeric literal", vec![])
            },
        }
    }
}
