use std::{path::PathBuf, rc::Rc};

use crate::{
    environment::prelude::Type,
    parser::prelude::{parse_source, Expression, Source, Statement},
    utils::prelude::{
        SrcSpan, TypeWarningEmitter, VectorWarningEmitterIO, Warning as EmittedWarning,
        WarningEmitter,
    },
};

use super::prelude::{require_assignable, AnalyzeError, ModuleAnalyzer, Warning};

fn analyze(src: &str) -> Result<Source, AnalyzeError> {
    let parsed = parse_source(src).expect("source should parse");
    ModuleAnalyzer::analyze(&parsed, &TypeWarningEmitter::null())?;

    Ok(parsed)
}

fn analyze_fault(src: &str) -> AnalyzeError {
    analyze(src).expect_err("analysis should raise a fault")
}

#[test]
fn test_assignability() {
    let location = SrcSpan { start: 0, end: 0 };

    assert!(require_assignable(Type::Any, Type::Nil, location).is_ok());
    assert!(require_assignable(Type::Comparable, Type::Integer, location).is_ok());
    assert!(require_assignable(Type::Comparable, Type::String, location).is_ok());
    assert!(require_assignable(Type::Integer, Type::Integer, location).is_ok());

    assert!(require_assignable(Type::Integer, Type::Decimal, location).is_err());
    assert!(require_assignable(Type::Comparable, Type::Nil, location).is_err());
    assert!(require_assignable(Type::Comparable, Type::Boolean, location).is_err());
}

#[test]
fn test_annotates_expression_types() {
    let source = analyze("FUN main ( ) : Integer DO RETURN 1 + 2 ; END")
        .expect("a well-typed program should analyze");

    let function = &source.functions[0];
    let signature = function.function.get().expect("function slot is filled");
    assert_eq!(signature.return_type, Type::Integer);
    assert!(signature.parameter_types.is_empty());

    let Statement::Return(statement) = &function.body[0] else {
        panic!("expected a return statement")
    };
    assert_eq!(statement.value.resolved_type(), Type::Integer);

    let Expression::Binary(binary) = &statement.value else {
        panic!("expected a binary expression")
    };
    assert_eq!(binary.left.resolved_type(), Type::Integer);
    assert_eq!(binary.right.resolved_type(), Type::Integer);
}

#[test]
fn test_access_binding_slots() {
    let source = analyze(
        r#"
        VAL greeting: String = "hello";
        FUN main ( ) : Integer DO
            print(greeting);
            RETURN 0;
        END
        "#,
    )
    .expect("a well-typed program should analyze");

    let global = source.globals[0].variable.get().expect("global slot is filled");
    assert_eq!(global.value_type, Type::String);
    assert!(!global.mutable);

    let Statement::Expression(statement) = &source.functions[0].body[0] else {
        panic!("expected an expression statement")
    };
    let Expression::Call(call) = &statement.expression else {
        panic!("expected a call")
    };

    let signature = call.function.get().expect("call slot is filled");
    assert_eq!(signature.jvm_name, "System.out.println");
    assert_eq!(statement.expression.resolved_type(), Type::Nil);
}

#[test]
fn test_condition_must_be_boolean() {
    let error = analyze_fault(
        "FUN main ( ) : Integer DO IF 1 DO print(1); END RETURN 0; END",
    );

    assert!(matches!(
        error,
        AnalyzeError::TypeMismatch { expected: Type::Boolean, got: Type::Integer, .. }
    ));
}

#[test]
fn test_while_body_scope_is_discarded() {
    let error = analyze_fault(
        r#"
        FUN main ( ) : Integer DO
            WHILE FALSE DO
                LET x: Integer = 1;
            END
            RETURN x;
        END
        "#,
    );

    assert!(matches!(error, AnalyzeError::VariableNotDeclared { name, .. } if name == "x"));
}

#[test]
fn test_shadowing_is_permitted() {
    analyze(
        r#"
        FUN main ( ) : Integer DO
            LET x: Integer = 1;
            IF TRUE DO
                LET x: String = "shadowed";
                print(x);
            END
            RETURN x;
        END
        "#,
    )
    .expect("shadowing in a child scope is allowed");
}

#[test]
fn test_missing_main() {
    let error = analyze_fault("FUN helper ( ) : Integer DO RETURN 0 ; END");
    assert_eq!(error, AnalyzeError::MissingMainFunction);

    // main with parameters is not main/0
    let error = analyze_fault("FUN main ( x: Integer ) : Integer DO RETURN 0 ; END");
    assert_eq!(error, AnalyzeError::MissingMainFunction);
}

#[test]
fn test_main_must_return_integer() {
    let error = analyze_fault("FUN main ( ) : String DO RETURN \"\" ; END");
    assert!(matches!(error, AnalyzeError::InvalidMainSignature { .. }));

    let error = analyze_fault("FUN main ( ) DO print(1); END");
    assert!(matches!(error, AnalyzeError::InvalidMainSignature { .. }));
}

#[test]
fn test_integer_literal_range() {
    // 2^32 - 1 still fits in 32 bits
    analyze("FUN main ( ) : Integer DO LET x = 4294967295; RETURN 0; END")
        .expect("a 32-bit literal is in range");

    let error = analyze_fault("FUN main ( ) : Integer DO LET x = 5000000000; RETURN 0; END");
    assert!(matches!(error, AnalyzeError::IntegerOutOfRange { .. }));
}

#[test]
fn test_switch_case_type_must_match_subject() {
    let error = analyze_fault(
        r#"
        FUN main ( ) : Integer DO
            SWITCH 1
                CASE 'a': print(1);
                DEFAULT: print(2);
            END
            RETURN 0;
        END
        "#,
    );

    assert!(matches!(
        error,
        AnalyzeError::TypeMismatch { expected: Type::Integer, got: Type::Character, .. }
    ));
}

#[test]
fn test_group_must_wrap_binary() {
    let error = analyze_fault("FUN main ( ) : Integer DO LET x = (1); RETURN 0; END");
    assert!(matches!(error, AnalyzeError::NonBinaryGroup { .. }));

    analyze("FUN main ( ) : Integer DO LET x = (1 + 2); RETURN 0; END")
        .expect("parentheses around a binary expression are allowed");
}

#[test]
fn test_list_elements_must_match() {
    let error = analyze_fault(
        "LIST l: Integer = [1, 2.5];\nFUN main ( ) : Integer DO RETURN 0; END",
    );

    assert!(matches!(
        error,
        AnalyzeError::TypeMismatch { expected: Type::Integer, got: Type::Decimal, .. }
    ));
}

#[test]
fn test_empty_list_adopts_declared_type() {
    let source = analyze("LIST l: Integer = [];\nFUN main ( ) : Integer DO RETURN 0; END")
        .expect("an empty list global should analyze");

    let value = source.globals[0].value.as_ref().expect("the list initializer is kept");
    assert_eq!(value.resolved_type(), Type::Integer);
}

#[test]
fn test_return_type_must_match() {
    let error = analyze_fault("FUN f ( ) : Integer DO RETURN \"text\" ; END");

    assert!(matches!(
        error,
        AnalyzeError::ReturnTypeMismatch { expected: Type::Integer, got: Type::String, .. }
    ));
}

#[test]
fn test_return_defaults_to_nil() {
    let error = analyze_fault("FUN f ( ) DO RETURN 1 ; END");

    assert!(matches!(
        error,
        AnalyzeError::ReturnTypeMismatch { expected: Type::Nil, got: Type::Integer, .. }
    ));
}

#[test]
fn test_expression_statement_must_be_call() {
    let error = analyze_fault("FUN main ( ) : Integer DO 1 + 2 ; RETURN 0 ; END");
    assert!(matches!(error, AnalyzeError::InvalidExpressionStatement { .. }));
}

#[test]
fn test_assignment_types() {
    let error = analyze_fault(
        "VAR x: Integer;\nFUN main ( ) : Integer DO x = \"text\"; RETURN 0; END",
    );
    assert!(matches!(error, AnalyzeError::TypeMismatch { expected: Type::Integer, .. }));

    // Mutability is not enforced on plain assignment.
    analyze("VAL x: Integer = 1;\nFUN main ( ) : Integer DO x = 2; RETURN x; END")
        .expect("assignment to an immutable global is not rejected");
}

#[test]
fn test_undeclared_names() {
    let error = analyze_fault("FUN main ( ) : Integer DO RETURN missing; END");
    assert!(matches!(error, AnalyzeError::VariableNotDeclared { name, .. } if name == "missing"));

    let error = analyze_fault("FUN main ( ) : Integer DO LET x = f(1); RETURN 0; END");
    assert!(matches!(
        error,
        AnalyzeError::FunctionNotDeclared { name, arity: 1, .. } if name == "f"
    ));
}

#[test]
fn test_unknown_type_name() {
    let error = analyze_fault("VAR x: Banana;\nFUN main ( ) : Integer DO RETURN 0; END");
    assert!(matches!(error, AnalyzeError::UnknownType { name, .. } if name == "Banana"));
}

#[test]
fn test_comparable_parameter_accepts_comparables() {
    analyze(
        r#"
        FUN widest ( x: Comparable ) : Integer DO RETURN 0 ; END
        FUN main ( ) : Integer DO RETURN widest(1) + widest("s") ; END
        "#,
    )
    .expect("Comparable accepts every comparable type");

    let error = analyze_fault(
        r#"
        FUN widest ( x: Comparable ) : Integer DO RETURN 0 ; END
        FUN main ( ) : Integer DO RETURN widest(NIL) ; END
        "#,
    );
    assert!(matches!(
        error,
        AnalyzeError::TypeMismatch { expected: Type::Comparable, got: Type::Nil, .. }
    ));
}

#[test]
fn test_warnings_are_emitted() {
    let src = r#"
        FUN main ( ) : Integer DO
            WHILE TRUE DO
                print(1);
            END
            RETURN 0;
            print(2);
        END
    "#;

    let parsed = parse_source(src).expect("source should parse");

    let warnings_io = Rc::new(VectorWarningEmitterIO::default());
    let emitter = TypeWarningEmitter::new(
        PathBuf::new(),
        src.to_string(),
        WarningEmitter::new(warnings_io.clone()),
    );

    ModuleAnalyzer::analyze(&parsed, &emitter).expect("the program is well-typed");

    let warnings = warnings_io.take();
    assert_eq!(warnings.len(), 2);

    assert!(warnings.iter().any(|warning| matches!(
        warning,
        EmittedWarning::Type { warning: Warning::InfiniteLoop { .. }, .. }
    )));
    assert!(warnings.iter().any(|warning| matches!(
        warning,
        EmittedWarning::Type { warning: Warning::UnreachableCode { .. }, .. }
    )));
}
