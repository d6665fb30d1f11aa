//! lispwalk - a tree-walking interpreter for a small parenthesized prefix language
//!
//! Source text is lexed into [`ast::Token`]s, assembled into a nested
//! [`ast::Value`] tree by the recursive-descent [`parser`], and evaluated
//! against an [`environment::Environment`] by the [`evaluator`].
//!
//! ```text
//! (func inc (x) (+ x 1))
//! (inc (- 12 1))          ; => 12
//! ```
//!
//! ## Language
//!
//! - Integers are 64-bit signed; overflow is an error, never a wrap.
//! - `true` and `false` are ordinary names pre-bound in the root environment.
//! - The builtins `if`, `+`, `-`, `begin` and `func` receive their operands
//!   unevaluated and decide their own evaluation order. User functions defined
//!   with `func` receive eagerly evaluated arguments.
//! - Every function call runs in a fork of the caller's environment, so the
//!   body sees every name visible at the call site, and bindings made inside
//!   the call never leak back to the caller.
//!
//! A program is a sequence of top-level expressions, run as one implicit
//! `(begin ...)`; its value is the value of the last expression.
//!
//! ## Modules
//!
//! - `lexer`: source text to tokens
//! - `parser`: tokens to expression trees
//! - `environment`: name bindings with independent forks
//! - `evaluator`: runtime values and tree-walking evaluation
//! - `builtins`: the fixed special-form registry

use std::fmt;

use crate::builtins::Arity;

pub mod ast;
pub mod builtins;
pub mod config;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod parser;
mod stack;

pub use config::Config;
pub use environment::Environment;
pub use evaluator::RuntimeValue;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseErrorKind {
    /// Unbalanced or truncated parenthesization, or nesting beyond the parse depth limit
    MalformedExpression,
    /// Tokens left over after the top-level expressions that cannot start a new one
    IncompleteParse,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseErrorKind::MalformedExpression => write!(f, "MalformedExpression"),
            ParseErrorKind::IncompleteParse => write!(f, "IncompleteParse"),
        }
    }
}

/// A structured error providing detailed information about a parsing failure.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Offset of the offending token, in code points from the start of the source
    pub location: usize,
    /// The problematic token text, if there was one
    pub found: Option<String>,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        location: usize,
        found: Option<String>,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            location,
            found,
        }
    }

    pub fn malformed(message: impl Into<String>, location: usize) -> Self {
        Self::new(ParseErrorKind::MalformedExpression, message, location, None)
    }
}

/// Error types for the interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Parse(ParseError),
    NameError {
        name: String,
        location: usize,
    },
    NotCallable {
        found: String,
        location: usize,
    },
    ArityError {
        name: String,
        expected: Arity,
        got: usize,
    },
    TypeError(String),
    /// Overflow, located at the literal or operand that caused it
    ArithmeticError {
        message: String,
        location: usize,
    },
    EvalError(String),
}

impl Error {
    pub fn arity_error(name: impl Into<String>, expected: Arity, got: usize) -> Self {
        Error::ArityError {
            name: name.into(),
            expected,
            got,
        }
    }

    /// Source offset the error points at, when one is known
    pub fn location(&self) -> Option<usize> {
        match self {
            Error::Parse(e) => Some(e.location),
            Error::NameError { location, .. }
            | Error::NotCallable { location, .. }
            | Error::ArithmeticError { location, .. } => Some(*location),
            Error::ArityError { .. } | Error::TypeError(_) | Error::EvalError(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(e) => {
                write!(f, "{}: {}", e.kind, e.message)?;
                if let Some(found) = &e.found {
                    write!(f, " (found `{found}`)")?;
                }
                Ok(())
            }
            Error::NameError { name, .. } => write!(f, "NameError: unbound identifier `{name}`"),
            Error::NotCallable { found, .. } => {
                write!(f, "NotCallable: `{found}` cannot be called")
            }
            Error::ArityError {
                name,
                expected,
                got,
            } => write!(
                f,
                "ArityError: `{name}` expected {expected} argument{}, got {got}",
                if matches!(expected, Arity::Exact(1) | Arity::AtLeast(1)) {
                    ""
                } else {
                    "s"
                }
            ),
            Error::TypeError(msg) => write!(f, "TypeError: {msg}"),
            Error::ArithmeticError { message, .. } => write!(f, "ArithmeticError: {message}"),
            Error::EvalError(msg) => write!(f, "EvaluationError: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

/// Lex, parse and evaluate a whole program with the default [`Config`].
pub fn run_program(source: &str) -> Result<RuntimeValue, Error> {
    run_program_with_config(source, &Config::default())
}

/// Lex, parse and evaluate a whole program in a fresh root environment.
pub fn run_program_with_config(source: &str, config: &Config) -> Result<RuntimeValue, Error> {
    let mut env = Environment::root();
    run_in_env(source, &mut env, config)
}

/// Run a program against an existing environment, keeping its top-level bindings.
///
/// Used by the REPL, where each line extends the same session.
pub fn run_in_env(
    source: &str,
    env: &mut Environment,
    config: &Config,
) -> Result<RuntimeValue, Error> {
    let tokens = lexer::lex(source);
    let program = parser::parse_program_with_config(&tokens, config)?;
    evaluator::eval_with_config(&program, env, config)
}

/// Render a one-line snippet of `source` around `offset` with a caret under it.
///
/// `offset` counts code points, matching [`ast::Token::location`].
pub fn context_snippet(source: &str, offset: usize) -> String {
    const MAX_CONTEXT: usize = 60;

    let (line, column) = lexer::line_col(source, offset);
    let text = source.lines().nth(line - 1).unwrap_or_default();

    // Show some context before the error, trimming very long lines
    let start = (column - 1).saturating_sub(MAX_CONTEXT / 2);
    let shown: String = text.chars().skip(start).take(MAX_CONTEXT).collect();
    let mut snippet = String::new();
    if start > 0 {
        snippet.push_str("[...]");
    }
    snippet.push_str(&shown);
    if start + shown.chars().count() < text.chars().count() {
        snippet.push_str("[...]");
    }

    let pad = if start > 0 { 5 } else { 0 } + (column - 1 - start);
    format!("{snippet}\n{}^", " ".repeat(pad))
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let cases = vec![
            (
                Error::arity_error("f", Arity::Exact(2), 1),
                "ArityError: `f` expected 2 arguments, got 1",
            ),
            (
                Error::arity_error("if", Arity::Exact(1), 0),
                "ArityError: `if` expected 1 argument, got 0",
            ),
            (
                Error::arity_error("-", Arity::AtLeast(1), 0),
                "ArityError: `-` expected at least 1 argument, got 0",
            ),
            (
                Error::NameError {
                    name: "x".into(),
                    location: 3,
                },
                "NameError: unbound identifier `x`",
            ),
            (
                Error::Parse(ParseError::new(
                    ParseErrorKind::IncompleteParse,
                    "unexpected `)`",
                    7,
                    Some(")".into()),
                )),
                "IncompleteParse: unexpected `)` (found `)`)",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_error_location() {
        assert_eq!(
            Error::Parse(ParseError::malformed("unclosed", 4)).location(),
            Some(4)
        );
        assert_eq!(Error::TypeError("x".into()).location(), None);
    }

    #[test]
    fn test_arithmetic_errors_point_at_the_operand() {
        let source = "(+ 1\n  99999999999999999999)";
        let err = run_program(source).unwrap_err();
        assert_eq!(
            err,
            Error::ArithmeticError {
                message: "integer literal `99999999999999999999` does not fit in 64 bits".into(),
                location: 7,
            }
        );
        assert_eq!(lexer::line_col(source, 7), (2, 3));

        let err = run_program("(+ 9223372036854775807 (+ 1 0))").unwrap_err();
        assert_eq!(err.location(), Some(23));
        assert_eq!(err.to_string(), "ArithmeticError: integer overflow in addition");

        let err = run_program("(- 0 9223372036854775807 2)").unwrap_err();
        assert_eq!(err.location(), Some(25));
    }

    #[test]
    fn test_carriage_return_inside_comment() {
        assert_eq!(
            run_program("; note\rmore\n(+ 1 2)"),
            Ok(RuntimeValue::Integer(3))
        );
    }

    #[test]
    fn test_context_snippet_points_at_offset() {
        let source = "(+ 1 2)\n(- x 1)";
        assert_eq!(context_snippet(source, 11), "(- x 1)\n   ^");
    }

    #[test]
    fn test_run_program() {
        assert_eq!(
            run_program("(+ 13 (- 12 1))").ok(),
            Some(RuntimeValue::Integer(24))
        );
        assert!(matches!(
            run_program("(+ 1 2"),
            Err(Error::Parse(ParseError {
                kind: ParseErrorKind::MalformedExpression,
                ..
            }))
        ));
    }

    #[test]
    fn test_run_in_env_keeps_bindings() {
        let config = Config::default();
        let mut env = Environment::root();
        run_in_env("(func sq (x) (+ x x))", &mut env, &config).ok();
        assert_eq!(
            run_in_env("(sq 21)", &mut env, &config).ok(),
            Some(RuntimeValue::Integer(42))
        );
    }
}
