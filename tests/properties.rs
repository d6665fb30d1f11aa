//! End-to-end checks of the language's observable behaviour through the
//! public API: arithmetic, short-circuiting, scoping, arity, sequencing and
//! malformed input.

#![allow(clippy::expect_used)] // test code OK

use lispwalk::ast::Value;
use lispwalk::builtins::Arity;
use lispwalk::{Error, ParseError, ParseErrorKind, RuntimeValue, lexer, parser, run_program};
use pretty_assertions::assert_eq;

fn parse_kind(result: Result<RuntimeValue, Error>) -> Option<ParseErrorKind> {
    match result {
        Err(Error::Parse(ParseError { kind, .. })) => Some(kind),
        _ => None,
    }
}

#[test]
fn arithmetic() {
    assert_eq!(run_program("(+ 13 (- 12 1))"), Ok(RuntimeValue::Integer(24)));
}

#[test]
fn if_only_evaluates_the_taken_branch() {
    assert_eq!(
        run_program("(if true 1 (undefined-fn))"),
        Ok(RuntimeValue::Integer(1))
    );
    assert_eq!(
        run_program("(if false (undefined-fn) 2)"),
        Ok(RuntimeValue::Integer(2))
    );
}

#[test]
fn parameters_do_not_escape_the_call() {
    assert_eq!(
        run_program("(func f (x) (+ x 1)) (f 5)"),
        Ok(RuntimeValue::Integer(6))
    );
    assert!(matches!(
        run_program("(func f (x) (+ x 1)) (f 5) x"),
        Err(Error::NameError { ref name, .. }) if name == "x"
    ));
}

#[test]
fn calls_see_the_callers_current_bindings() {
    assert_eq!(
        run_program("(func f (x) (g x)) (func g (x) (+ x 1)) (f 1)"),
        Ok(RuntimeValue::Integer(2))
    );
    assert_eq!(
        run_program("(func show () y) (func caller (y) (show)) (caller 4)"),
        Ok(RuntimeValue::Integer(4))
    );
}

#[test]
fn closure_arity_is_enforced() {
    assert_eq!(
        run_program("(func f (a b) (+ a b)) (f 1)"),
        Err(Error::ArityError {
            name: "f".into(),
            expected: Arity::Exact(2),
            got: 1,
        })
    );
}

#[test]
fn begin_returns_the_last_value() {
    assert_eq!(
        run_program("(begin (+ 1 1) (+ 2 2))"),
        Ok(RuntimeValue::Integer(4))
    );
}

#[test]
fn malformed_input() {
    assert_eq!(
        parse_kind(run_program("(+ 1 2")),
        Some(ParseErrorKind::MalformedExpression)
    );
    assert_eq!(
        parse_kind(run_program("(+ 1 2))")),
        Some(ParseErrorKind::IncompleteParse)
    );
}

#[test]
fn printed_trees_parse_back_to_the_same_tree() {
    let sources = [
        "(+ 13 (- 12 1))",
        "(func   fib (a b)\n\t(+ a b))",
        "((()) x 007)",
    ];

    for source in sources {
        let tokens = lexer::lex(source);
        let (tree, _) = parser::parse(&tokens, 0).expect("valid source");
        let printed = tree.to_string();
        let (reparsed, next) = parser::parse(&lexer::lex(&printed), 0).expect("printed source");
        assert_eq!(reparsed, tree);
        assert_eq!(printed, reparsed.to_string());
        assert!(next > 0);
    }
}

#[test]
fn program_tree_is_a_begin_call() {
    let program = parser::parse_program(&lexer::lex("(+ 1 2) (- 3 4)")).expect("valid program");
    let items = program.as_list().expect("program is a list");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_identifier(), Some("begin"));
    assert!(matches!(items[1], Value::List { .. }));
}

#[test]
fn empty_program_has_no_value() {
    assert!(matches!(
        run_program("; nothing\n"),
        Err(Error::ArityError { ref name, got: 0, .. }) if name == "begin"
    ));
}
