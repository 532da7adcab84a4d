use num_bigint::BigInt;

use super::prelude::{
    parse_expression, parse_source, BinaryOperator, Expression, LiteralValue, ParseErrorType,
    Statement,
};

fn expression(src: &str) -> Expression {
    parse_expression(src).expect("expression should parse")
}

fn integer(expression: &Expression, expected: i64) -> bool {
    matches!(
        expression,
        Expression::Literal(literal)
            if literal.value == LiteralValue::Integer(BigInt::from(expected))
    )
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let Expression::Binary(sum) = expression("1 + 2 * 3") else {
        panic!("expected a binary expression")
    };

    assert_eq!(sum.operator, BinaryOperator::Add);
    assert!(integer(&sum.left, 1));

    let Expression::Binary(product) = &*sum.right else {
        panic!("expected the right operand to be a product")
    };

    assert_eq!(product.operator, BinaryOperator::Multiply);
    assert!(integer(&product.left, 2));
    assert!(integer(&product.right, 3));
}

#[test]
fn test_binary_operators_fold_left() {
    let Expression::Binary(outer) = expression("1 - 2 - 3") else {
        panic!("expected a binary expression")
    };

    assert_eq!(outer.operator, BinaryOperator::Subtract);
    assert!(integer(&outer.right, 3));

    let Expression::Binary(inner) = &*outer.left else {
        panic!("expected the left operand to be the first subtraction")
    };

    assert_eq!(inner.operator, BinaryOperator::Subtract);
    assert!(integer(&inner.left, 1));
    assert!(integer(&inner.right, 2));
}

#[test]
fn test_comparison_is_weaker_than_addition() {
    let Expression::Binary(comparison) = expression("1 + 2 < 4") else {
        panic!("expected a binary expression")
    };

    assert_eq!(comparison.operator, BinaryOperator::LessThan);
    assert!(matches!(&*comparison.left, Expression::Binary(sum) if sum.operator == BinaryOperator::Add));
}

#[test]
fn test_logical_is_weakest() {
    let Expression::Binary(logical) = expression("a == b && c != d") else {
        panic!("expected a binary expression")
    };

    assert_eq!(logical.operator, BinaryOperator::And);
}

#[test]
fn test_group_call_and_index() {
    assert!(matches!(expression("(1 + 2)"), Expression::Group(_)));

    let Expression::Call(call) = expression("f(1, x)") else {
        panic!("expected a call")
    };
    assert_eq!(call.name, "f");
    assert_eq!(call.arguments.len(), 2);

    let Expression::Access(indexed) = expression("xs[0]") else {
        panic!("expected an access")
    };
    assert_eq!(indexed.name, "xs");
    assert!(indexed.offset.is_some());

    let Expression::Access(plain) = expression("xs") else {
        panic!("expected an access")
    };
    assert!(plain.offset.is_none());
}

#[test]
fn test_globals() {
    let source = parse_source(
        r#"
        LIST l: Integer = [1, 2, 3];
        LIST empty: Integer = [];
        VAR x: Integer = 5;
        VAR uninitialized: Decimal;
        VAL greeting: String = "hello";
        "#,
    )
    .expect("globals should parse");

    assert_eq!(source.globals.len(), 5);

    let list = &source.globals[0];
    assert!(list.mutable);
    assert_eq!(list.type_name, "Integer");
    let Some(Expression::List(elements)) = &list.value else {
        panic!("expected a list initializer")
    };
    assert_eq!(elements.elements.len(), 3);

    let Some(Expression::List(empty)) = &source.globals[1].value else {
        panic!("expected a list initializer")
    };
    assert!(empty.elements.is_empty());

    assert!(source.globals[2].mutable);
    assert!(source.globals[3].value.is_none());

    let immutable = &source.globals[4];
    assert!(!immutable.mutable);
    assert!(immutable.value.is_some());
}

#[test]
fn test_function_signature() {
    let source = parse_source("FUN add ( a: Integer, b: Integer ) : Integer DO RETURN a + b ; END")
        .expect("function should parse");

    let function = &source.functions[0];
    assert_eq!(function.name, "add");
    assert_eq!(function.parameters, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(function.parameter_type_names, vec!["Integer".to_string(), "Integer".to_string()]);
    assert_eq!(function.return_type_name.as_deref(), Some("Integer"));
    assert!(matches!(function.body.as_slice(), [Statement::Return(_)]));
}

#[test]
fn test_statements() {
    let source = parse_source(
        r#"
        FUN main ( ) : Integer DO
            LET x: Integer = 1;
            LET y = 2;
            LET z: Integer;
            x = x + y;
            IF x > 2 DO
                print(x);
            ELSE
                print(y);
            END
            WHILE x < 10 DO
                x = x + 1;
            END
            SWITCH x
                CASE 10: print("ten");
                DEFAULT: print("other");
            END
            RETURN x;
        END
        "#,
    )
    .expect("statements should parse");

    let body = &source.functions[0].body;
    assert_eq!(body.len(), 8);

    let Statement::Declaration(typed) = &body[0] else { panic!("expected a declaration") };
    assert_eq!(typed.type_name.as_deref(), Some("Integer"));
    assert!(typed.value.is_some());

    let Statement::Declaration(untyped) = &body[1] else { panic!("expected a declaration") };
    assert!(untyped.type_name.is_none());

    let Statement::Declaration(uninitialized) = &body[2] else { panic!("expected a declaration") };
    assert!(uninitialized.value.is_none());

    assert!(matches!(&body[3], Statement::Assignment(_)));

    let Statement::If(conditional) = &body[4] else { panic!("expected an if") };
    assert_eq!(conditional.then_block.len(), 1);
    assert_eq!(conditional.else_block.len(), 1);

    assert!(matches!(&body[5], Statement::While(_)));

    let Statement::Switch(switch) = &body[6] else { panic!("expected a switch") };
    assert_eq!(switch.cases.len(), 2);
    assert!(switch.cases[0].value.is_some());
    assert!(switch.cases[1].value.is_none());

    assert!(matches!(&body[7], Statement::Return(_)));
}

#[test]
fn test_switch_requires_default_case() {
    let error = parse_source(
        r#"
        FUN main ( ) : Integer DO
            SWITCH x
                CASE 1: print(x);
            END
            RETURN 0;
        END
        "#,
    )
    .expect_err("a switch without a default case must not parse");

    assert_eq!(error.error, ParseErrorType::MissingDefaultCase);
}

#[test]
fn test_missing_semicolon() {
    let error = parse_source("VAR x: Integer = 5")
        .expect_err("a global without a terminator must not parse");

    assert_eq!(error.error, ParseErrorType::MissingSemicolon);
    // The fault points at the last consumed token once input is exhausted.
    assert_eq!(error.span.start, 17);
}

#[test]
fn test_missing_do() {
    let error = parse_source("FUN main ( ) : Integer RETURN 1 ; END")
        .expect_err("a function without DO must not parse");

    assert!(matches!(error.error, ParseErrorType::UnexpectedToken { .. }));
    assert_eq!(error.span.start, 23);
}

#[test]
fn test_invalid_top_level_token() {
    let error = parse_source("RETURN 1 ;").expect_err("statements cannot appear at top level");

    assert!(matches!(error.error, ParseErrorType::UnexpectedToken { .. }));
}

#[test]
fn test_lexical_fault_takes_priority() {
    let error = parse_source("VAR x: Integer = $ 5 ;")
        .expect_err("an unrecognized character must surface");

    assert!(matches!(error.error, ParseErrorType::LexError { .. }));
    assert_eq!(error.span.start, 17);
}
