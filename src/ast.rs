//! Tokens and the expression tree built from them.
//!
//! A [`Token`] is the smallest lexical unit; a [`Value`] is either a single
//! literal token or a parenthesized list of nested values. Trees are produced
//! once by the parser and only read afterwards, so they are plain owned data.
//!
//! The [`fmt::Display`] impl on [`Value`] is the tree printer: it renders the
//! canonical `(op arg ...)` form, which lexes and parses back to an equal tree.
//! Helpers [`ident`], [`int`] and [`list`] build trees in tests and tools.

use std::fmt;

/// Lexical category of a [`Token`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `(` or `)`
    Syntax,
    /// Any other run of non-delimiter characters, e.g. `+`, `begin`, `my-fn`
    Identifier,
    /// A run of ASCII digits
    Integer,
}

/// A lexical unit with its source offset (in code points)
#[derive(Debug, Clone, Eq)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
    pub location: usize,
}

impl Token {
    pub fn new(value: impl Into<String>, kind: TokenKind, location: usize) -> Self {
        Token {
            value: value.into(),
            kind,
            location,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.kind == TokenKind::Syntax && self.value == "("
    }

    pub(crate) fn is_close(&self) -> bool {
        self.kind == TokenKind::Syntax && self.value == ")"
    }
}

// Locations are metadata; two tokens are the same token if kind and text agree.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value == other.value
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Expression tree node
#[derive(Debug, Clone, Eq)]
pub enum Value {
    /// A single identifier or integer token
    Literal(Token),
    /// A parenthesized expression; `location` is the offset of its `(`
    List { items: Vec<Value>, location: usize },
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Literal(a), Value::Literal(b)) => a == b,
            (Value::List { items: a, .. }, Value::List { items: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Value {
    pub fn location(&self) -> usize {
        match self {
            Value::Literal(token) => token.location,
            Value::List { location, .. } => *location,
        }
    }

    /// The identifier text, if this is an identifier literal
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Value::Literal(token) if token.kind == TokenKind::Identifier => Some(&token.value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List { items, .. } => Some(items),
            Value::Literal(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Literal(token) => write!(f, "{token}"),
            Value::List { items, .. } => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Identifier literal with no meaningful location
pub fn ident(name: &str) -> Value {
    Value::Literal(Token::new(name, TokenKind::Identifier, 0))
}

/// Integer literal with no meaningful location
pub fn int(n: u64) -> Value {
    Value::Literal(Token::new(n.to_string(), TokenKind::Integer, 0))
}

/// List node with no meaningful location
pub fn list(items: impl Into<Vec<Value>>) -> Value {
    Value::List {
        items: items.into(),
        location: 0,
    }
}
