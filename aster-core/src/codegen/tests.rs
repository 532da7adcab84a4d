use crate::{
    analyzer::prelude::ModuleAnalyzer,
    parser::prelude::parse_source,
    utils::prelude::TypeWarningEmitter,
};

use super::prelude::generate;

fn transpile(src: &str) -> String {
    let parsed = parse_source(src).expect("source should parse");
    ModuleAnalyzer::analyze(&parsed, &TypeWarningEmitter::null()).expect("source should analyze");

    generate(&parsed)
}

#[test]
fn test_minimal_program() {
    let generated = transpile("FUN main ( ) : Integer DO RETURN 1 + 2 ; END");

    let expected = [
        "public class Main {",
        "",
        "    public static void main(String[] args) {",
        "        System.exit(new Main().main());",
        "    }",
        "",
        "    int main() {",
        "        return 1 + 2;",
        "    }",
        "",
        "}",
    ]
    .join("\n");

    assert_eq!(generated, expected);
}

#[test]
fn test_globals_render_as_fields() {
    let generated = transpile(
        r#"
        VAL g: Integer = 1;
        LIST l: Integer = [1, 2, 3];
        FUN main ( ) : Integer DO RETURN g + l[0]; END
        "#,
    );

    let expected = [
        "public class Main {",
        "",
        "    final int g = 1;",
        "    int[] l = {1, 2, 3};",
        "",
        "    public static void main(String[] args) {",
        "        System.exit(new Main().main());",
        "    }",
        "",
        "    int main() {",
        "        return g + l[0];",
        "    }",
        "",
        "}",
    ]
    .join("\n");

    assert_eq!(generated, expected);
}

#[test]
fn test_statement_rendering() {
    let generated = transpile(
        r#"
        FUN main ( ) : Integer DO
            LET x = 2;
            IF x > 1 DO
                print("big");
            ELSE
                print("small");
            END
            SWITCH x
                CASE 1: print("one");
                DEFAULT: print("other");
            END
            WHILE FALSE DO END
            RETURN x ^ 2;
        END
        "#,
    );

    let expected = [
        "public class Main {",
        "",
        "    public static void main(String[] args) {",
        "        System.exit(new Main().main());",
        "    }",
        "",
        "    int main() {",
        "        int x = 2;",
        "        if (x > 1) {",
        "            System.out.println(\"big\");",
        "        } else {",
        "            System.out.println(\"small\");",
        "        }",
        "        switch (x) {",
        "            case 1:",
        "                System.out.println(\"one\");",
        "                break;",
        "            default:",
        "                System.out.println(\"other\");",
        "        }",
        "        while (false) ;",
        "        return Math.pow(x, 2);",
        "    }",
        "",
        "}",
    ]
    .join("\n");

    assert_eq!(generated, expected);
}

#[test]
fn test_type_and_literal_rendering() {
    let generated = transpile(
        r#"
        VAL pi: Decimal = 3.14;
        FUN greet ( c: Character, s: String ) DO
            print(s);
            print(c);
            print(NIL);
        END
        FUN truthy ( ) : Boolean DO RETURN TRUE; END
        FUN main ( ) : Integer DO
            greet('x', "hi");
            RETURN 0;
        END
        "#,
    );

    assert!(generated.contains("final double pi = 3.14;"));
    assert!(generated.contains("void greet(char c, String s) {"));
    assert!(generated.contains("boolean truthy() {"));
    assert!(generated.contains("return true;"));
    assert!(generated.contains("System.out.println(null);"));
    assert!(generated.contains("greet('x', \"hi\");"));
}

#[test]
fn test_groups_keep_their_parentheses() {
    let generated = transpile(
        "FUN main ( ) : Integer DO RETURN (1 + 2) * 3 ; END",
    );

    assert!(generated.contains("return (1 + 2) * 3;"));
}
