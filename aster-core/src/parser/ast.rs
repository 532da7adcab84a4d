use std::cell::OnceCell;
use std::fmt::Display;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::{
    environment::prelude::{FunctionType, Type, Variable},
    lexer::prelude::{LexResult, Token},
    parser::prelude::{parse_error, Parse, ParseError, ParseErrorType, Parser},
    utils::prelude::SrcSpan,
};

// source -> { function | global }
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub globals: Vec<Global>,
    pub functions: Vec<Function>,
    pub location: SrcSpan,
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Source {
    fn parse(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        let mut globals = vec![];
        let mut functions = vec![];
        let mut end = 0;

        while let Some((_, token, _)) = &parser.current_token {
            end = match token {
                Token::Fun => {
                    let function = Function::parse(parser)?;
                    let end = function.location.end;
                    functions.push(function);
                    end
                },
                _ => {
                    let global = Global::parse(parser)?;
                    let end = global.location.end;
                    globals.push(global);
                    end
                },
            };
        }

        Ok(Self {
            globals,
            functions,
            location: SrcSpan { start: 0, end },
        })
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let globals = self.globals.iter()
            .map(|global| global.to_string())
            .collect::<Vec<String>>();
        let functions = self.functions.iter()
            .map(|function| function.to_string())
            .collect::<Vec<String>>();

        write!(f, "{}", globals.into_iter().chain(functions).collect::<Vec<String>>().join("\n"))
    }
}

// global -> (list | mutable | immutable) ;
#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    pub name: String,
    pub type_name: String,
    pub mutable: bool,
    pub value: Option<Expression>,
    pub location: SrcSpan,
    pub variable: OnceCell<Variable>,
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Global {
    fn parse(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        let mut global = match &parser.current_token {
            Some((_, Token::List, _)) => Self::parse_list(parser)?,
            Some((_, Token::Var, _)) => Self::parse_mutable(parser)?,
            Some((_, Token::Val, _)) => Self::parse_immutable(parser)?,
            Some((start, token, end)) => {
                return parse_error(
                    ParseErrorType::UnexpectedToken {
                        token: token.clone(),
                        expected: vec!["LIST".into(), "VAR".into(), "VAL".into(), "FUN".into()],
                    },
                    SrcSpan { start: *start, end: *end },
                )
            },
            None => return parse_error(ParseErrorType::UnexpectedEof, parser.eof_span()),
        };

        match parser.expect_one(Token::Semicolon) {
            Ok((_, end)) => global.location.end = end,
            Err(error) => return parse_error(ParseErrorType::MissingSemicolon, error.span),
        }

        Ok(global)
    }
}

impl Global {
    // list -> LIST identifier : type = [ [expression {, expression}] ]
    fn parse_list<T: Iterator<Item = LexResult>>(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::List)?;
        let (_, name, _) = parser.expect_ident()?;
        let _ = parser.expect_one(Token::Colon)?;
        let (_, type_name, _) = parser.expect_type_name()?;
        let _ = parser.expect_one(Token::Assign)?;
        let (bracket_start, _) = parser.expect_one(Token::LSBracket)?;

        let mut elements = vec![];
        let end = match parser.expect_one(Token::RSBracket) {
            Ok((_, end)) => end,
            Err(_) => {
                loop {
                    elements.push(Expression::parse(parser)?);
                    if parser.expect_one(Token::Comma).is_err() {
                        break;
                    }
                }
                let (_, end) = parser.expect_one(Token::RSBracket)?;
                end
            },
        };

        let value = Expression::List(ListLiteral {
            elements,
            location: SrcSpan { start: bracket_start, end },
            resolved_type: OnceCell::new(),
        });

        Ok(Self {
            name,
            type_name,
            mutable: true,
            value: Some(value),
            location: SrcSpan { start, end },
            variable: OnceCell::new(),
        })
    }

    // mutable -> VAR identifier : type [= expression]
    fn parse_mutable<T: Iterator<Item = LexResult>>(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Var)?;
        let (_, name, _) = parser.expect_ident()?;
        let _ = parser.expect_one(Token::Colon)?;
        let (_, type_name, mut end) = parser.expect_type_name()?;

        let value = if parser.expect_one(Token::Assign).is_ok() {
            let value = Expression::parse(parser)?;
            end = value.location().end;
            Some(value)
        } else {
            None
        };

        Ok(Self {
            name,
            type_name,
            mutable: true,
            value,
            location: SrcSpan { start, end },
            variable: OnceCell::new(),
        })
    }

    // immutable -> VAL identifier : type = expression
    fn parse_immutable<T: Iterator<Item = LexResult>>(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Val)?;
        let (_, name, _) = parser.expect_ident()?;
        let _ = parser.expect_one(Token::Colon)?;
        let (_, type_name, _) = parser.expect_type_name()?;
        let _ = parser.expect_one(Token::Assign)?;

        let value = Expression::parse(parser)?;
        let end = value.location().end;

        Ok(Self {
            name,
            type_name,
            mutable: false,
            value: Some(value),
            location: SrcSpan { start, end },
            variable: OnceCell::new(),
        })
    }
}

impl Display for Global {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keyword = match (&self.value, self.mutable) {
            (Some(Expression::List(_)), _) => "LIST",
            (_, true) => "VAR",
            (_, false) => "VAL",
        };

        write!(f, "{keyword} {}: {}", self.name, self.type_name)?;
        if let Some(value) = &self.value {
            write!(f, " = {value}")?;
        }
        write!(f, ";")
    }
}

// function -> FUN identifier ( [identifier : type {, identifier : type}] ) [: type] DO block END
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<String>,
    pub parameter_type_names: Vec<String>,
    pub return_type_name: Option<String>,
    pub body: Vec<Statement>,
    pub location: SrcSpan,
    pub function: OnceCell<FunctionType>,
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Function {
    fn parse(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Fun)?;
        let (_, name, _) = parser.expect_ident()?;
        let _ = parser.expect_one(Token::LParen)?;

        let mut parameters = vec![];
        let mut parameter_type_names = vec![];
        if parser.expect_one(Token::RParen).is_err() {
            loop {
                let (_, parameter, _) = parser.expect_ident()?;
                let _ = parser.expect_one(Token::Colon)?;
                let (_, type_name, _) = parser.expect_type_name()?;

                parameters.push(parameter);
                parameter_type_names.push(type_name);

                if parser.expect_one(Token::Comma).is_err() {
                    break;
                }
            }
            let _ = parser.expect_one(Token::RParen)?;
        }

        let return_type_name = if parser.expect_one(Token::Colon).is_ok() {
            let (_, type_name, _) = parser.expect_type_name()?;
            Some(type_name)
        } else {
            None
        };

        let _ = parser.expect_one(Token::Do)?;
        let body = parse_block(parser)?;
        let (_, end) = parser.expect_one(Token::End)?;

        Ok(Self {
            name,
            parameters,
            parameter_type_names,
            return_type_name,
            body,
            location: SrcSpan { start, end },
            function: OnceCell::new(),
        })
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parameters = self.parameters.iter()
            .zip(&self.parameter_type_names)
            .map(|(name, type_name)| format!("{name}: {type_name}"))
            .collect::<Vec<String>>();

        write!(f, "FUN {}({})", self.name, parameters.join(", "))?;
        if let Some(return_type_name) = &self.return_type_name {
            write!(f, ": {return_type_name}")?;
        }
        write!(f, " DO {} END", display_block(&self.body))
    }
}

// block -> { statement }
// Stops, without consuming, at END, ELSE, CASE, DEFAULT or end of input.
pub fn parse_block<T: Iterator<Item = LexResult>>(
    parser: &mut Parser<T>,
) -> Result<Vec<Statement>, ParseError> {
    let mut statements = vec![];

    while let Some((_, token, _)) = &parser.current_token {
        if matches!(token, Token::End | Token::Else | Token::Case | Token::Default) {
            break;
        }
        statements.push(Statement::parse(parser)?);
    }

    Ok(statements)
}

fn display_block(statements: &[Statement]) -> String {
    statements.iter()
        .map(|statement| statement.to_string())
        .collect::<Vec<String>>()
        .join(" ")
}

// statement -> declaration | conditional | switch | loop | return | expression_or_assignment
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(ExpressionStatement),
    Declaration(Declaration),
    Assignment(Assignment),
    If(If),
    Switch(Switch),
    While(While),
    Return(Return),
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Statement {
    fn parse(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        let statement = match &parser.current_token {
            Some((_, Token::Let, _)) => Self::Declaration(Declaration::parse(parser)?),
            Some((_, Token::If, _)) => Self::If(If::parse(parser)?),
            Some((_, Token::Switch, _)) => Self::Switch(Switch::parse(parser)?),
            Some((_, Token::While, _)) => Self::While(While::parse(parser)?),
            Some((_, Token::Return, _)) => Self::Return(Return::parse(parser)?),
            Some(_) => {
                let expression = Expression::parse(parser)?;
                let start = expression.location().start;

                if parser.expect_one(Token::Assign).is_ok() {
                    let value = Expression::parse(parser)?;
                    let end = expect_semicolon(parser)?;

                    Self::Assignment(Assignment {
                        receiver: expression,
                        value,
                        location: SrcSpan { start, end },
                    })
                } else {
                    let end = expect_semicolon(parser)?;

                    Self::Expression(ExpressionStatement {
                        expression,
                        location: SrcSpan { start, end },
                    })
                }
            },
            None => return parse_error(ParseErrorType::UnexpectedEof, parser.eof_span()),
        };

        Ok(statement)
    }
}

impl Statement {
    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Expression(statement) => statement.location,
            Self::Declaration(statement) => statement.location,
            Self::Assignment(statement) => statement.location,
            Self::If(statement) => statement.location,
            Self::Switch(statement) => statement.location,
            Self::While(statement) => statement.location,
            Self::Return(statement) => statement.location,
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expression(statement) => write!(f, "{statement}"),
            Self::Declaration(statement) => write!(f, "{statement}"),
            Self::Assignment(statement) => write!(f, "{statement}"),
            Self::If(statement) => write!(f, "{statement}"),
            Self::Switch(statement) => write!(f, "{statement}"),
            Self::While(statement) => write!(f, "{statement}"),
            Self::Return(statement) => write!(f, "{statement}"),
        }
    }
}

fn expect_semicolon<T: Iterator<Item = LexResult>>(
    parser: &mut Parser<T>,
) -> Result<u32, ParseError> {
    match parser.expect_one(Token::Semicolon) {
        Ok((_, end)) => Ok(end),
        Err(error) => parse_error(ParseErrorType::MissingSemicolon, error.span),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub location: SrcSpan,
}

impl Display for ExpressionStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{};", self.expression)
    }
}

// declaration -> LET identifier [: type] [= expression] ;
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub type_name: Option<String>,
    pub value: Option<Expression>,
    pub location: SrcSpan,
    pub variable: OnceCell<Variable>,
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Declaration {
    fn parse(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Let)?;
        let (_, name, _) = parser.expect_ident()?;

        let type_name = if parser.expect_one(Token::Colon).is_ok() {
            let (_, type_name, _) = parser.expect_type_name()?;
            Some(type_name)
        } else {
            None
        };

        let value = if parser.expect_one(Token::Assign).is_ok() {
            Some(Expression::parse(parser)?)
        } else {
            None
        };

        let end = expect_semicolon(parser)?;

        Ok(Self {
            name,
            type_name,
            value,
            location: SrcSpan { start, end },
            variable: OnceCell::new(),
        })
    }
}

impl Display for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LET {}", self.name)?;
        if let Some(type_name) = &self.type_name {
            write!(f, ": {type_name}")?;
        }
        if let Some(value) = &self.value {
            write!(f, " = {value}")?;
        }
        write!(f, ";")
    }
}

// assignment -> expression = expression ;
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub receiver: Expression,
    pub value: Expression,
    pub location: SrcSpan,
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {};", self.receiver, self.value)
    }
}

// conditional -> IF expression DO block [ELSE block] END
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: Expression,
    pub then_block: Vec<Statement>,
    pub else_block: Vec<Statement>,
    pub location: SrcSpan,
}

impl<T: Iterator<Item = LexResult>> Parse<T> for If {
    fn parse(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::If)?;
        let condition = Expression::parse(parser)?;
        let _ = parser.expect_one(Token::Do)?;
        let then_block = parse_block(parser)?;

        let else_block = if parser.expect_one(Token::Else).is_ok() {
            parse_block(parser)?
        } else {
            vec![]
        };

        let (_, end) = parser.expect_one(Token::End)?;

        Ok(Self {
            condition,
            then_block,
            else_block,
            location: SrcSpan { start, end },
        })
    }
}

impl Display for If {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IF {} DO {}", self.condition, display_block(&self.then_block))?;
        if !self.else_block.is_empty() {
            write!(f, " ELSE {}", display_block(&self.else_block))?;
        }
        write!(f, " END")
    }
}

// switch -> SWITCH expression { CASE expression : block } DEFAULT : block END
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub subject: Expression,
    pub cases: Vec<Case>,
    pub location: SrcSpan,
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Switch {
    fn parse(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Switch)?;
        let subject = Expression::parse(parser)?;

        let mut cases = vec![];
        while matches!(&parser.current_token, Some((_, Token::Case, _))) {
            cases.push(Case::parse(parser)?);
        }

        if !matches!(&parser.current_token, Some((_, Token::Default, _))) {
            let span = match &parser.current_token {
                Some((start, _, end)) => SrcSpan { start: *start, end: *end },
                None => parser.eof_span(),
            };

            return parse_error(ParseErrorType::MissingDefaultCase, span);
        }
        cases.push(Case::parse(parser)?);

        let (_, end) = parser.expect_one(Token::End)?;

        Ok(Self {
            subject,
            cases,
            location: SrcSpan { start, end },
        })
    }
}

impl Display for Switch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cases = self.cases.iter()
            .map(|case| case.to_string())
            .collect::<Vec<String>>();

        write!(f, "SWITCH {} {} END", self.subject, cases.join(" "))
    }
}

// case -> CASE expression : block | DEFAULT : block
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub value: Option<Expression>,
    pub body: Vec<Statement>,
    pub location: SrcSpan,
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Case {
    fn parse(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        match parser.expect_one(Token::Case) {
            Ok((start, _)) => {
                let value = Expression::parse(parser)?;
                let (_, colon_end) = parser.expect_one(Token::Colon)?;
                let body = parse_block(parser)?;

                let end = body.last()
                    .map(|statement| statement.location().end)
                    .unwrap_or(colon_end);

                Ok(Self {
                    value: Some(value),
                    body,
                    location: SrcSpan { start, end },
                })
            },
            Err(_) => {
                let (start, _) = parser.expect_one(Token::Default)?;
                let (_, colon_end) = parser.expect_one(Token::Colon)?;
                let body = parse_block(parser)?;

                let end = body.last()
                    .map(|statement| statement.location().end)
                    .unwrap_or(colon_end);

                Ok(Self {
                    value: None,
                    body,
                    location: SrcSpan { start, end },
                })
            },
        }
    }
}

impl Display for Case {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "CASE {value}: {}", display_block(&self.body)),
            None => write!(f, "DEFAULT: {}", display_block(&self.body)),
        }
    }
}

// loop -> WHILE expression DO block END
#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub condition: Expression,
    pub body: Vec<Statement>,
    pub location: SrcSpan,
}

impl<T: Iterator<Item = LexResult>> Parse<T> for While {
    fn parse(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::While)?;
        let condition = Expression::parse(parser)?;
        let _ = parser.expect_one(Token::Do)?;
        let body = parse_block(parser)?;
        let (_, end) = parser.expect_one(Token::End)?;

        Ok(Self {
            condition,
            body,
            location: SrcSpan { start, end },
        })
    }
}

impl Display for While {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WHILE {} DO {} END", self.condition, display_block(&self.body))
    }
}

// return -> RETURN expression ;
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub value: Expression,
    pub location: SrcSpan,
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Return {
    fn parse(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        let (start, _) = parser.expect_one(Token::Return)?;
        let value = Expression::parse(parser)?;
        let end = expect_semicolon(parser)?;

        Ok(Self {
            value,
            location: SrcSpan { start, end },
        })
    }
}

impl Display for Return {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RETURN {};", self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    And,
    Or,
    LessThan,
    GreaterThan,
    Equal,
    NotEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl BinaryOperator {
    pub fn from_token(token: &Token) -> Option<Self> {
        Some(match token {
            Token::And => Self::And,
            Token::Or => Self::Or,
            Token::LessThan => Self::LessThan,
            Token::GreaterThan => Self::GreaterThan,
            Token::Equal => Self::Equal,
            Token::NotEqual => Self::NotEqual,
            Token::Plus => Self::Add,
            Token::Minus => Self::Subtract,
            Token::Mult => Self::Multiply,
            Token::Div => Self::Divide,
            Token::Caret => Self::Power,
            _ => return None,
        })
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::And => "&&",
            Self::Or => "||",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Power => "^",
        };

        write!(f, "{operator}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Nil,
    Boolean(bool),
    Integer(BigInt),
    Decimal(BigDecimal),
    Character(char),
    String(String),
}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => write!(f, "NIL"),
            Self::Boolean(true) => write!(f, "TRUE"),
            Self::Boolean(false) => write!(f, "FALSE"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::Character(value) => write!(f, "'{value}'"),
            Self::String(value) => write!(f, "\"{value}\""),
        }
    }
}

// expression -> logical, with precedence encoded by the call chain:
// logical -> comparison -> additive -> multiplicative -> primary
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Group(Group),
    Binary(Binary),
    Access(Access),
    Call(Call),
    List(ListLiteral),
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Expression {
    fn parse(parser: &mut Parser<T>) -> Result<Self, ParseError> {
        Self::parse_logical(parser)
    }
}

impl Expression {
    fn parse_logical<T: Iterator<Item = LexResult>>(
        parser: &mut Parser<T>,
    ) -> Result<Self, ParseError> {
        let mut left = Self::parse_comparison(parser)?;

        while let Some(operator) = parser.eat_operator(&[BinaryOperator::And, BinaryOperator::Or]) {
            let right = Self::parse_comparison(parser)?;
            left = Self::binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_comparison<T: Iterator<Item = LexResult>>(
        parser: &mut Parser<T>,
    ) -> Result<Self, ParseError> {
        let mut left = Self::parse_additive(parser)?;

        while let Some(operator) = parser.eat_operator(&[
            BinaryOperator::LessThan,
            BinaryOperator::GreaterThan,
            BinaryOperator::Equal,
            BinaryOperator::NotEqual,
        ]) {
            let right = Self::parse_additive(parser)?;
            left = Self::binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_additive<T: Iterator<Item = LexResult>>(
        parser: &mut Parser<T>,
    ) -> Result<Self, ParseError> {
        let mut left = Self::parse_multiplicative(parser)?;

        while let Some(operator) = parser.eat_operator(&[BinaryOperator::Add, BinaryOperator::Subtract]) {
            let right = Self::parse_multiplicative(parser)?;
            left = Self::binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative<T: Iterator<Item = LexResult>>(
        parser: &mut Parser<T>,
    ) -> Result<Self, ParseError> {
        let mut left = Self::parse_primary(parser)?;

        while let Some(operator) = parser.eat_operator(&[
            BinaryOperator::Multiply,
            BinaryOperator::Divide,
            BinaryOperator::Power,
        ]) {
            let right = Self::parse_primary(parser)?;
            left = Self::binary(operator, left, right);
        }

        Ok(left)
    }

    // primary -> NIL | TRUE | FALSE | literal | ( expression )
    //          | identifier [( arguments ) | [ expression ]]
    fn parse_primary<T: Iterator<Item = LexResult>>(
        parser: &mut Parser<T>,
    ) -> Result<Self, ParseError> {
        let Some((start, token, end)) = parser.current_token.clone() else {
            return parse_error(ParseErrorType::UnexpectedEof, parser.eof_span());
        };
        let location = SrcSpan { start, end };

        let expression = match token {
            Token::Nil => {
                parser.step();
                Self::literal(LiteralValue::Nil, location)
            },
            Token::True => {
                parser.step();
                Self::literal(LiteralValue::Boolean(true), location)
            },
            Token::False => {
                parser.step();
                Self::literal(LiteralValue::Boolean(false), location)
            },
            Token::Int(value) => {
                parser.step();
                Self::literal(LiteralValue::Integer(value), location)
            },
            Token::Decimal(value) => {
                parser.step();
                Self::literal(LiteralValue::Decimal(value), location)
            },
            Token::Char(value) => {
                parser.step();
                Self::literal(LiteralValue::Character(value), location)
            },
            Token::Str(value) => {
                parser.step();
                Self::literal(LiteralValue::String(value), location)
            },
            Token::LParen => {
                parser.step();
                let inner = Expression::parse(parser)?;
                let (_, end) = parser.expect_one(Token::RParen)?;

                Self::Group(Group {
                    inner: Box::new(inner),
                    location: SrcSpan { start, end },
                    resolved_type: OnceCell::new(),
                })
            },
            Token::Ident(name) => {
                parser.step();

                if parser.expect_one(Token::LParen).is_ok() {
                    let mut arguments = vec![];
                    let end = match parser.expect_one(Token::RParen) {
                        Ok((_, end)) => end,
                        Err(_) => {
                            loop {
                                arguments.push(Expression::parse(parser)?);
                                if parser.expect_one(Token::Comma).is_err() {
                                    break;
                                }
                            }
                            let (_, end) = parser.expect_one(Token::RParen)?;
                            end
                        },
                    };

                    Self::Call(Call {
                        name,
                        arguments,
                        location: SrcSpan { start, end },
                        resolved_type: OnceCell::new(),
                        function: OnceCell::new(),
                    })
                } else if parser.expect_one(Token::LSBracket).is_ok() {
                    let offset = Expression::parse(parser)?;
                    let (_, end) = parser.expect_one(Token::RSBracket)?;

                    Self::Access(Access {
                        name,
                        offset: Some(Box::new(offset)),
                        location: SrcSpan { start, end },
                        resolved_type: OnceCell::new(),
                        variable: OnceCell::new(),
                    })
                } else {
                    Self::Access(Access {
                        name,
                        offset: None,
                        location,
                        resolved_type: OnceCell::new(),
                        variable: OnceCell::new(),
                    })
                }
            },
            token => return parse_error(ParseErrorType::InvalidPrimaryExpression { token }, location),
        };

        Ok(expression)
    }

    fn literal(value: LiteralValue, location: SrcSpan) -> Self {
        Self::Literal(Literal {
            value,
            location,
            resolved_type: OnceCell::new(),
        })
    }

    fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        let location = SrcSpan {
            start: left.location().start,
            end: right.location().end,
        };

        Self::Binary(Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            location,
            resolved_type: OnceCell::new(),
        })
    }

    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Literal(literal) => literal.location,
            Self::Group(group) => group.location,
            Self::Binary(binary) => binary.location,
            Self::Access(access) => access.location,
            Self::Call(call) => call.location,
            Self::List(list) => list.location,
        }
    }

    pub(crate) fn type_slot(&self) -> &OnceCell<Type> {
        match self {
            Self::Literal(literal) => &literal.resolved_type,
            Self::Group(group) => &group.resolved_type,
            Self::Binary(binary) => &binary.resolved_type,
            Self::Access(access) => &access.resolved_type,
            Self::Call(call) => &call.resolved_type,
            Self::List(list) => &list.resolved_type,
        }
    }

    /// The type written by the analyzer. Reading it from an un-analyzed
    /// tree is a programming error.
    pub fn resolved_type(&self) -> Type {
        self.type_slot()
            .get()
            .copied()
            .expect("expression type is resolved during analysis")
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{}", literal.value),
            Self::Group(group) => write!(f, "({})", group.inner),
            Self::Binary(binary) => {
                write!(f, "{} {} {}", binary.left, binary.operator, binary.right)
            },
            Self::Access(access) => match &access.offset {
                Some(offset) => write!(f, "{}[{offset}]", access.name),
                None => write!(f, "{}", access.name),
            },
            Self::Call(call) => {
                let arguments = call.arguments.iter()
                    .map(|argument| argument.to_string())
                    .collect::<Vec<String>>();

                write!(f, "{}({})", call.name, arguments.join(", "))
            },
            Self::List(list) => {
                let elements = list.elements.iter()
                    .map(|element| element.to_string())
                    .collect::<Vec<String>>();

                write!(f, "[{}]", elements.join(", "))
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LiteralValue,
    pub location: SrcSpan,
    pub resolved_type: OnceCell<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub inner: Box<Expression>,
    pub location: SrcSpan,
    pub resolved_type: OnceCell<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub location: SrcSpan,
    pub resolved_type: OnceCell<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Access {
    pub name: String,
    pub offset: Option<Box<Expression>>,
    pub location: SrcSpan,
    pub resolved_type: OnceCell<Type>,
    pub variable: OnceCell<Variable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub arguments: Vec<Expression>,
    pub location: SrcSpan,
    pub resolved_type: OnceCell<Type>,
    pub function: OnceCell<FunctionType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListLiteral {
    pub elements: Vec<Expression>,
    pub location: SrcSpan,
    pub resolved_type: OnceCell<Type>,
}
