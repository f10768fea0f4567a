use minic::interpreter::RuntimeError;
use minic::lexer::{self, LexError, Token};
use minic::parser::ParseError;
use minic::Error;

fn run_err(code: &str) -> Error {
    let mut buffer = Vec::new();
    minic::execute(code, &mut buffer).expect_err("program should fail")
}

#[test]
fn tokens_carry_line_numbers() {
    let tokens = lexer::tokenize("int x = 42;\nx++;").expect("source should tokenize");
    assert_eq!(Token::Int, tokens[0].token);
    assert_eq!(1, tokens[0].line);
    assert_eq!(Token::Identifier("x".to_string()), tokens[5].token);
    assert_eq!(2, tokens[5].line);
    assert_eq!(Token::PlusPlus, tokens[6].token);
}

#[test]
fn maximal_munch_prefers_two_char_operators() {
    let tokens = lexer::tokenize("a<=b==c").expect("source should tokenize");
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.token).collect();
    assert_eq!(
        vec![
            Token::Identifier("a".to_string()),
            Token::LessEqual,
            Token::Identifier("b".to_string()),
            Token::Equal,
            Token::Identifier("c".to_string()),
        ],
        kinds
    );
}

#[test]
fn comments_are_skipped_but_count_lines() {
    let code = "\
        int main() {\n\
            // comment line\n\
            /* block\n\
               comment */\n\
            int x = 5\n\
            return x;\n\
        }";
    let err = run_err(code);
    match err {
        Error::Syntax(ParseError::Expected { expected, found, line }) => {
            assert_eq!(";", expected);
            assert_eq!("return", found);
            assert_eq!(6, line);
        }
        other => panic!("expected a syntax error, got {}", other),
    }
}

#[test]
fn unterminated_string_is_a_lex_error() {
    let code = "int main() {\n    string s = \"oops;\n    return 0;\n}";
    let err = run_err(code);
    assert!(matches!(
        err,
        Error::Lex(LexError::UnterminatedString(2))
    ));
    assert!(err.to_string().starts_with("Lexical error:"));
}

#[test]
fn unexpected_character_is_a_lex_error() {
    let err = run_err("int main() { int x = 5 @ 3; return x; }");
    assert!(matches!(err, Error::Lex(LexError::UnexpectedChar('@', 1))));
}

#[test]
fn missing_operand_is_a_syntax_error() {
    let err = run_err("int main() { int x = ; return 0; }");
    assert!(matches!(err, Error::Syntax(ParseError::UnexpectedToken { .. })));
    assert!(err.to_string().starts_with("Syntax error:"));
}

#[test]
fn undeclared_variable_names_the_culprit() {
    let err = run_err("int main() { print(y); return 0; }");
    assert!(matches!(err, Error::Runtime(_)));
    assert!(err.to_string().contains("'y'"));
    assert!(err.to_string().contains("not declared"));
}

#[test]
fn redeclaration_is_rejected() {
    let err = run_err("int main() { int x = 1; int x = 2; return 0; }");
    assert!(err.to_string().contains("'x'"));
    assert!(err.to_string().contains("already declared"));
}

#[test]
fn typed_for_initializer_cannot_redeclare() {
    // one flat environment per call: the second loop redeclares i
    let code = "\
        int main() {\n\
            int k = 0;\n\
            for (int i = 0; i < 2; i++) { k++; }\n\
            for (int i = 0; i < 2; i++) { k++; }\n\
            return k;\n\
        }";
    let err = run_err(code);
    assert!(err.to_string().contains("already declared"));
}

#[test]
fn array_index_out_of_bounds() {
    let err = run_err("int main() { int a[3]; a[3] = 1; return 0; }");
    assert!(matches!(err, Error::Runtime(_)));
    assert!(err.to_string().contains("index 3 out of bounds"));
    // runtime errors carry the originating statement
    assert!(err.to_string().contains("(in array assignment)"));
}

#[test]
fn inner_dimension_is_bounds_checked() {
    let err = run_err("int main() { int g[2][3]; g[1][3] = 1; return 0; }");
    assert!(err.to_string().contains("index 3 out of bounds"));
}

#[test]
fn indexing_a_scalar_fails() {
    let err = run_err("int main() { int x = 1; print(x[0]); return 0; }");
    assert!(err.to_string().contains("not an array"));
}

#[test]
fn arity_mismatch_reports_both_counts() {
    let code = "int add(int a, int b) { return a + b; } int main() { return add(1); }";
    let err = run_err(code);
    assert!(err.to_string().contains("expects 2 arguments, got 1"));
}

#[test]
fn unknown_function_is_a_runtime_error() {
    let err = run_err("int main() { return missing(); }");
    assert!(err.to_string().contains("'missing'"));
    assert!(err.to_string().contains("not defined"));
}

#[test]
fn missing_main_fails_before_execution() {
    let err = run_err("int helper() { return 1; }");
    assert!(matches!(err, Error::Runtime(RuntimeError::MissingMain)));
}

#[test]
fn mismatched_operands_are_rejected() {
    let err = run_err("int main() { string s = \"a\"; int x = s - 1; return x; }");
    assert!(err.to_string().contains("Invalid operands for '-'"));
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let err = run_err("int main() { print(1 / 0); return 0; }");
    assert!(err.to_string().contains("Division by zero"));
}

#[test]
fn break_outside_a_loop_is_rejected() {
    let err = run_err("int main() { break; return 0; }");
    assert!(err.to_string().contains("'break' outside"));
}

#[test]
fn continue_outside_a_loop_is_rejected() {
    let err = run_err("int main() { continue; return 0; }");
    assert!(err.to_string().contains("'continue' outside"));
}
