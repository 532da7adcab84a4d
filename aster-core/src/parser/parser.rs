use crate::{
    lexer::prelude::{LexResult, Lexer, LexicalError, Spanned, Token},
    utils::prelude::SrcSpan,
};

use super::ast::{BinaryOperator, Expression, Source};
use super::error::{parse_error, ParseError, ParseErrorType};

/// Implemented by every AST node that corresponds to a grammar rule.
pub trait Parse<T: Iterator<Item = LexResult>>
    where Self: Sized,
{
    fn parse(parser: &mut Parser<T>) -> Result<Self, ParseError>;
}

pub struct Parser<T: Iterator<Item = LexResult>> {
    pub current_token: Option<Spanned>,
    pub next_token: Option<Spanned>,
    pub lex_errors: Vec<LexicalError>,

    last_location: SrcSpan,
    tokens: T,
}

impl<T: Iterator<Item = LexResult>> Parser<T> {
    pub fn new(input: T) -> Self {
        let mut parser = Self {
            current_token: None,
            next_token: None,
            lex_errors: vec![],

            last_location: SrcSpan { start: 0, end: 0 },
            tokens: input,
        };

        parser.step();
        parser.step();

        parser
    }

    pub fn step(&mut self) {
        let _ = self.next_token();
    }

    pub fn next_token(&mut self) -> Option<Spanned> {
        let token = self.current_token.take();

        let mut next = None;
        if self.lex_errors.is_empty() {
            match self.tokens.next() {
                Some(Ok(spanned)) => next = Some(spanned),
                Some(Err(error)) => self.lex_errors.push(error),
                None => {},
            }
        }

        self.current_token = self.next_token.take();
        self.next_token = next;

        if let Some((start, _, end)) = &token {
            self.last_location = SrcSpan { start: *start, end: *end };
        }

        token
    }

    /// The span parse faults point at when the input is exhausted: the
    /// last consumed token's span.
    pub fn eof_span(&self) -> SrcSpan {
        self.last_location
    }

    pub fn parse(&mut self) -> Result<Source, ParseError> {
        let source = Source::parse(self);

        // A fault while scanning ends the token stream early; it takes
        // priority over whatever parse fault that caused.
        if let Some(error) = self.lex_errors.first() {
            return parse_error(
                ParseErrorType::LexError { error: *error },
                error.location,
            );
        }

        source
    }

    pub fn expect_one(&mut self, token: Token) -> Result<(u32, u32), ParseError> {
        match self.current_token.take() {
            Some((start, tok, end)) if tok == token => {
                self.last_location = SrcSpan { start, end };
                self.step();
                Ok((start, end))
            },
            Some(t) => {
                let (start, tok, end) = t.clone();
                self.current_token = Some(t);

                parse_error(
                    ParseErrorType::UnexpectedToken {
                        token: tok,
                        expected: vec![token.as_literal()],
                    },
                    SrcSpan { start, end },
                )
            },
            None => parse_error(ParseErrorType::UnexpectedEof, self.eof_span()),
        }
    }

    pub fn expect_ident(&mut self) -> Result<(u32, String, u32), ParseError> {
        match self.current_token.take() {
            Some((start, Token::Ident(value), end)) => {
                self.last_location = SrcSpan { start, end };
                self.step();
                Ok((start, value, end))
            },
            Some(t) => {
                let (start, _, end) = t.clone();
                self.current_token = Some(t);

                parse_error(ParseErrorType::ExpectedIdent, SrcSpan { start, end })
            },
            None => parse_error(ParseErrorType::UnexpectedEof, self.eof_span()),
        }
    }

    pub fn expect_type_name(&mut self) -> Result<(u32, String, u32), ParseError> {
        self.expect_ident()
            .map_err(|error| ParseError { error: ParseErrorType::ExpectedType, span: error.span })
    }

    /// Consumes and returns the current token's operator when it is one of
    /// `operators`; leaves the stream untouched otherwise.
    pub fn eat_operator(&mut self, operators: &[BinaryOperator]) -> Option<BinaryOperator> {
        let (_, token, _) = self.current_token.as_ref()?;
        let operator = BinaryOperator::from_token(token)?;

        if operators.contains(&operator) {
            self.step();
            Some(operator)
        } else {
            None
        }
    }
}

pub fn parse_source(src: &str) -> Result<Source, ParseError> {
    let lexer = Lexer::new(src.char_indices().map(|(i, c)| (i as u32, c)));
    let mut parser = Parser::new(lexer);

    parser.parse()
}

pub fn parse_source_from_stream(stream: impl Iterator<Item = char>) -> Result<Source, ParseError> {
    let lexer = Lexer::new(stream.scan(0, |position, c| {
        *position += c.len_utf8() as u32;
        Some((*position - c.len_utf8() as u32, c))
    }));
    let mut parser = Parser::new(lexer);

    parser.parse()
}

/// Parses a single expression, for the read-parse-print loop and tests.
pub fn parse_expression(src: &str) -> Result<Expression, ParseError> {
    let lexer = Lexer::new(src.char_indices().map(|(i, c)| (i as u32, c)));
    let mut parser = Parser::new(lexer);

    Expression::parse(&mut parser)
}
