//! Recursive-descent parser from a flat token stream to expression trees.
//!
//! ```text
//! ( + 13 ( - 12 1 ) )        List
//!                            ├── +
//!                            ├── 13
//!                            └── List
//!                                ├── -
//!                                ├── 12
//!                                └── 1
//! ```
//!
//! A program is several top-level expressions; [`parse_program`] wraps them
//! into a single `(begin ...)` so running a program is evaluating one call.

use crate::ast::{Token, TokenKind, Value};
use crate::config::{Config, MAX_PARSE_DEPTH};
use crate::stack::ensure_sufficient_stack;
use crate::{Error, ParseError, ParseErrorKind};

/// Parse one expression starting at `tokens[start]`.
///
/// Returns the expression and the index of the first token after it.
pub fn parse(tokens: &[Token], start: usize) -> Result<(Value, usize), Error> {
    parse_with_depth(tokens, start, 0, MAX_PARSE_DEPTH)
}

/// Offset just past the last token, used when input runs out
fn end_of_input(tokens: &[Token]) -> usize {
    tokens
        .last()
        .map_or(0, |token| token.location + token.value.chars().count())
}

fn parse_with_depth(
    tokens: &[Token],
    start: usize,
    depth: usize,
    max_depth: usize,
) -> Result<(Value, usize), Error> {
    let Some(token) = tokens.get(start) else {
        return Err(ParseError::malformed(
            "unexpected end of input, expected an expression",
            end_of_input(tokens),
        )
        .into());
    };

    if token.is_close() {
        return Err(ParseError::new(
            ParseErrorKind::MalformedExpression,
            "unexpected `)`, expected an expression",
            token.location,
            Some(token.value.clone()),
        )
        .into());
    }

    if !token.is_open() {
        return Ok((Value::Literal(token.clone()), start + 1));
    }

    if depth >= max_depth {
        return Err(ParseError::malformed(
            format!("expression too deeply nested (max depth: {max_depth})"),
            token.location,
        )
        .into());
    }

    let mut items = Vec::new();
    let mut index = start + 1;
    loop {
        match tokens.get(index) {
            None => {
                return Err(ParseError::malformed(
                    "unclosed `(`: input ended before the matching `)`",
                    token.location,
                )
                .into());
            }
            Some(next) if next.is_close() => {
                let list = Value::List {
                    items,
                    location: token.location,
                };
                return Ok((list, index + 1));
            }
            Some(_) => {
                let (child, next_index) = ensure_sufficient_stack(|| {
                    parse_with_depth(tokens, index, depth + 1, max_depth)
                })?;
                items.push(child);
                index = next_index;
            }
        }
    }
}

/// Parse every top-level expression and wrap them in `(begin ...)`.
pub fn parse_program(tokens: &[Token]) -> Result<Value, Error> {
    parse_program_with_config(tokens, &Config::default())
}

pub fn parse_program_with_config(tokens: &[Token], config: &Config) -> Result<Value, Error> {
    let mut items = vec![Value::Literal(Token::new("begin", TokenKind::Identifier, 0))];
    let mut index = 0;

    while let Some(token) = tokens.get(index) {
        // A stray `)` can never start an expression, so the rest cannot be consumed
        if token.is_close() {
            return Err(ParseError::new(
                ParseErrorKind::IncompleteParse,
                "unmatched `)` after a complete expression",
                token.location,
                Some(token.value.clone()),
            )
            .into());
        }

        let (expr, next_index) = parse_with_depth(tokens, index, 0, config.max_parse_depth)?;
        items.push(expr);
        index = next_index;
    }

    tracing::debug!(expressions = items.len() - 1, "parsed program");
    Ok(Value::List { items, location: 0 })
}
