use num_bigint::BigInt;

use crate::{
    analyzer::prelude::ModuleAnalyzer,
    environment::prelude::Value,
    parser::prelude::parse_source,
    utils::prelude::TypeWarningEmitter,
};

use super::prelude::{RuntimeError, RuntimeErrorType};
use super::Interpreter;

fn run(src: &str) -> (Result<Value, RuntimeError>, String) {
    let parsed = parse_source(src).expect("source should parse");
    ModuleAnalyzer::analyze(&parsed, &TypeWarningEmitter::null()).expect("source should analyze");

    let mut output = Vec::new();
    let result = Interpreter::with_output(&mut output).interpret(&parsed);

    (result, String::from_utf8(output).expect("interpreter output is utf8"))
}

fn run_value(src: &str) -> Value {
    let (result, _) = run(src);
    result.expect("program should run without faults")
}

fn run_fault(src: &str) -> RuntimeError {
    let (result, _) = run(src);
    result.expect_err("program should raise a runtime fault")
}

#[test]
fn test_main_result() {
    let value = run_value("FUN main ( ) : Integer DO RETURN 1 + 2 ; END");
    assert_eq!(value, Value::Integer(BigInt::from(3)));
}

#[test]
fn test_interpretation_does_not_need_analysis() {
    let parsed = parse_source("FUN main ( ) : Integer DO RETURN 40 + 2 ; END")
        .expect("source should parse");

    let mut output = Vec::new();
    let value = Interpreter::with_output(&mut output)
        .interpret(&parsed)
        .expect("an un-analyzed program still runs");

    assert_eq!(value, Value::Integer(BigInt::from(42)));
}

#[test]
fn test_globals_are_defined_in_order() {
    let value = run_value(
        r#"
        VAR a: Integer = 1;
        VAR b: Integer = a + 1;
        FUN main ( ) : Integer DO RETURN b; END
        "#,
    );

    assert_eq!(value, Value::Integer(BigInt::from(2)));
}

#[test]
fn test_print_writes_in_call_order() {
    let (result, output) = run(
        r#"
        FUN main ( ) : Integer DO
            print("first");
            print(2);
            print(3.5);
            print(TRUE);
            RETURN 0;
        END
        "#,
    );

    result.expect("program should run");
    assert_eq!(output, "first\n2\n3.5\ntrue\n");
}

#[test]
fn test_while_loop() {
    let value = run_value(
        r#"
        FUN main ( ) : Integer DO
            LET total: Integer = 0;
            LET i: Integer = 0;
            WHILE i < 5 DO
                total = total + i;
                i = i + 1;
            END
            RETURN total;
        END
        "#,
    );

    assert_eq!(value, Value::Integer(BigInt::from(10)));
}

#[test]
fn test_return_unwinds_nested_blocks() {
    let value = run_value(
        r#"
        FUN find ( ) : Integer DO
            LET i: Integer = 0;
            WHILE TRUE DO
                IF i > 2 DO
                    RETURN i;
                END
                i = i + 1;
            END
            RETURN 0 - 1;
        END
        FUN main ( ) : Integer DO RETURN find(); END
        "#,
    );

    assert_eq!(value, Value::Integer(BigInt::from(3)));
}

#[test]
fn test_recursion() {
    let value = run_value(
        r#"
        FUN fact ( n: Integer ) : Integer DO
            IF n < 2 DO
                RETURN 1;
            END
            RETURN n * fact(n - 1);
        END
        FUN main ( ) : Integer DO RETURN fact(5); END
        "#,
    );

    assert_eq!(value, Value::Integer(BigInt::from(120)));
}

#[test]
fn test_falling_off_a_body_yields_nil() {
    let (result, output) = run(
        r#"
        FUN noop ( ) DO print("side"); END
        FUN main ( ) : Integer DO
            print(noop());
            RETURN 0;
        END
        "#,
    );

    result.expect("program should run");
    assert_eq!(output, "side\nnil\n");
}

#[test]
fn test_switch_picks_first_matching_case() {
    let (result, output) = run(
        r#"
        FUN describe ( x: Integer ) : String DO
            SWITCH x
                CASE 1: RETURN "one";
                CASE 2: RETURN "two";
                DEFAULT: RETURN "many";
            END
            RETURN "";
        END
        FUN main ( ) : Integer DO
            print(describe(1));
            print(describe(2));
            print(describe(9));
            RETURN 0;
        END
        "#,
    );

    result.expect("program should run");
    assert_eq!(output, "one\ntwo\nmany\n");
}

#[test]
fn test_or_short_circuits_and_does_not() {
    let (result, output) = run(
        r#"
        FUN noisy ( ) : Boolean DO
            print("called");
            RETURN TRUE;
        END
        FUN main ( ) : Integer DO
            LET a: Boolean = TRUE || noisy();
            LET b: Boolean = TRUE && noisy();
            RETURN 0;
        END
        "#,
    );

    result.expect("program should run");
    // `||` never evaluated its right operand; `&&` did.
    assert_eq!(output, "called\n");
}

#[test]
fn test_string_concatenation() {
    let (result, output) = run(
        r#"
        FUN main ( ) : Integer DO
            print("a" + 1);
            print('c' + "s");
            print(1.5 + " left");
            RETURN 0;
        END
        "#,
    );

    result.expect("program should run");
    assert_eq!(output, "a1\ncs\n1.5 left\n");
}

#[test]
fn test_decimal_division_rounds_half_to_even() {
    let (result, output) = run(
        r#"
        FUN main ( ) : Integer DO
            print(5.0 / 4.0);
            print(7.0 / 2.0);
            print(1.0 / 3.0);
            RETURN 0;
        END
        "#,
    );

    result.expect("program should run");
    assert_eq!(output, "1.2\n3.5\n0.3\n");
}

#[test]
fn test_integer_division_truncates() {
    let value = run_value("FUN main ( ) : Integer DO RETURN 7 / 2 ; END");
    assert_eq!(value, Value::Integer(BigInt::from(3)));
}

#[test]
fn test_division_by_zero() {
    let error = run_fault("FUN main ( ) : Integer DO RETURN 1 / 0 ; END");
    assert_eq!(error.error, RuntimeErrorType::DivisionByZero);

    let error = run_fault(
        "FUN main ( ) : Integer DO print(1.0 / 0.0); RETURN 0 ; END",
    );
    assert_eq!(error.error, RuntimeErrorType::DivisionByZero);
}

#[test]
fn test_power_is_iterative_self_squaring() {
    // 2 squares three times: 2, 4, 16, 256.
    let value = run_value("FUN main ( ) : Integer DO RETURN 2 ^ 3 ; END");
    assert_eq!(value, Value::Integer(BigInt::from(256)));

    // A zero exponent leaves the accumulator untouched.
    let value = run_value("FUN main ( ) : Integer DO RETURN 7 ^ 0 ; END");
    assert_eq!(value, Value::Integer(BigInt::from(7)));
}

#[test]
fn test_list_element_assignment() {
    let (result, output) = run(
        r#"
        LIST l: Integer = [1, 2, 3];
        FUN main ( ) : Integer DO
            l[1] = 5;
            print(l);
            RETURN l[1];
        END
        "#,
    );

    assert_eq!(result.expect("program should run"), Value::Integer(BigInt::from(5)));
    assert_eq!(output, "[1, 5, 3]\n");
}

#[test]
fn test_list_index_out_of_bounds() {
    let error = run_fault(
        r#"
        LIST l: Integer = [1, 2, 3];
        FUN main ( ) : Integer DO
            l[9] = 0;
            RETURN 0;
        END
        "#,
    );

    assert_eq!(
        error.error,
        RuntimeErrorType::IndexOutOfBounds { index: BigInt::from(9), length: 3 }
    );
}

#[test]
fn test_indexing_a_scalar_faults() {
    let error = run_fault(
        r#"
        VAR x: Integer = 1;
        FUN main ( ) : Integer DO RETURN x[0]; END
        "#,
    );

    assert_eq!(error.error, RuntimeErrorType::IndexingNonList { got: "Integer" });
}

#[test]
fn test_plain_assignment_ignores_mutability() {
    let value = run_value(
        r#"
        VAL x: Integer = 1;
        FUN main ( ) : Integer DO
            x = 2;
            RETURN x;
        END
        "#,
    );

    assert_eq!(value, Value::Integer(BigInt::from(2)));
}

#[test]
fn test_equality_is_value_equality() {
    let (result, output) = run(
        r#"
        FUN main ( ) : Integer DO
            print("a" == "a");
            print(1 != 2);
            print('x' == 'y');
            RETURN 0;
        END
        "#,
    );

    result.expect("program should run");
    assert_eq!(output, "true\ntrue\nfalse\n");
}

#[test]
fn test_comparisons_use_natural_ordering() {
    let (result, output) = run(
        r#"
        FUN main ( ) : Integer DO
            print(1 < 2);
            print(2.5 > 2.4);
            print("abc" < "abd");
            print('a' > 'b');
            RETURN 0;
        END
        "#,
    );

    result.expect("program should run");
    assert_eq!(output, "true\ntrue\ntrue\nfalse\n");
}
