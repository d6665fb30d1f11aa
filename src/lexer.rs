//! Source text to tokens.
//!
//! Whitespace separates tokens and `;` starts a comment that runs to the end of
//! the line. `(` and `)` are syntax tokens, a run of ASCII digits is an integer
//! and any other run of characters up to whitespace, a parenthesis or `;` is an
//! identifier. Lexing never fails: every character either is trivia or starts
//! a token.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_till, take_while1},
    character::complete::{char, one_of},
    combinator::{map, recognize},
    sequence::pair,
};

use crate::ast::{Token, TokenKind};

fn is_identifier_char(c: char) -> bool {
    !(c.is_whitespace() || c == '(' || c == ')' || c == ';')
}

/// Whitespace or a `;` comment running up to the next `\n`.
///
/// Every other character, a lone `\r` included, stays inside the comment.
fn trivia(input: &str) -> IResult<&str, &str> {
    alt((
        take_while1(char::is_whitespace),
        recognize(pair(char(';'), take_till(|c: char| c == '\n'))),
    ))
    .parse(input)
}

fn syntax_token(input: &str) -> IResult<&str, (TokenKind, &str)> {
    map(recognize(one_of("()")), |text| (TokenKind::Syntax, text)).parse(input)
}

// "12a" lexes as `12` followed by `a`
fn integer_token(input: &str) -> IResult<&str, (TokenKind, &str)> {
    map(take_while1(|c: char| c.is_ascii_digit()), |text| {
        (TokenKind::Integer, text)
    })
    .parse(input)
}

fn identifier_token(input: &str) -> IResult<&str, (TokenKind, &str)> {
    map(take_while1(is_identifier_char), |text| {
        (TokenKind::Identifier, text)
    })
    .parse(input)
}

fn token(input: &str) -> IResult<&str, (TokenKind, &str)> {
    alt((syntax_token, integer_token, identifier_token)).parse(input)
}

/// Trivia or one token.
///
/// Whitespace and `;` open trivia, parentheses and digits open their own
/// tokens and every remaining character opens an identifier, so this only
/// fails on empty input.
fn piece(input: &str) -> IResult<&str, Option<(TokenKind, &str)>> {
    alt((map(trivia, |_| None), map(token, Some))).parse(input)
}

/// Split `source` into tokens, recording each token's offset in code points.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut offset = 0;

    while let Ok((remaining, lexed)) = piece(rest) {
        let consumed = &rest[..rest.len() - remaining.len()];
        if let Some((kind, text)) = lexed {
            tokens.push(Token::new(text, kind, offset));
        }
        offset += consumed.chars().count();
        rest = remaining;
    }
    debug_assert!(rest.is_empty(), "lexer left input unconsumed");

    tracing::trace!(count = tokens.len(), "lexed source");
    tokens
}

/// Convert a code-point offset into a 1-based `(line, column)` pair.
///
/// Offsets past the end of `source` map to the position just after its last
/// character.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for c in source.chars().take(offset) {
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::{Identifier, Integer, Syntax};

    fn kinds_and_text(source: &str) -> Vec<(TokenKind, String)> {
        lex(source)
            .into_iter()
            .map(|token| (token.kind, token.value))
            .collect()
    }

    #[test]
    fn test_lex_token_kinds() {
        let test_cases: Vec<(&str, Vec<(TokenKind, &str)>)> = vec![
            ("", vec![]),
            ("   \n\t ", vec![]),
            (
                "(+ 13 2)",
                vec![
                    (Syntax, "("),
                    (Identifier, "+"),
                    (Integer, "13"),
                    (Integer, "2"),
                    (Syntax, ")"),
                ],
            ),
            (
                " (+ 13 2  )",
                vec![
                    (Syntax, "("),
                    (Identifier, "+"),
                    (Integer, "13"),
                    (Integer, "2"),
                    (Syntax, ")"),
                ],
            ),
            // Digits split off the front of a word
            ("12a", vec![(Integer, "12"), (Identifier, "a")]),
            ("ab123", vec![(Identifier, "ab123")]),
            // No negative literals: a leading minus makes an identifier
            ("-5", vec![(Identifier, "-5")]),
            ("((x))", vec![
                (Syntax, "("),
                (Syntax, "("),
                (Identifier, "x"),
                (Syntax, ")"),
                (Syntax, ")"),
            ]),
            ("foo(bar", vec![(Identifier, "foo"), (Syntax, "("), (Identifier, "bar")]),
            (
                "(+ 1 ; trailing comment\n 2)",
                vec![
                    (Syntax, "("),
                    (Identifier, "+"),
                    (Integer, "1"),
                    (Integer, "2"),
                    (Syntax, ")"),
                ],
            ),
            ("; only a comment", vec![]),
            ("a;b", vec![(Identifier, "a")]),
            ("λx", vec![(Identifier, "λx")]),
            // A carriage return does not end a comment, only `\n` does
            (
                "; note\rmore\n(+ 1 2)",
                vec![
                    (Syntax, "("),
                    (Identifier, "+"),
                    (Integer, "1"),
                    (Integer, "2"),
                    (Syntax, ")"),
                ],
            ),
            ("(a ; x\r\n b)", vec![
                (Syntax, "("),
                (Identifier, "a"),
                (Identifier, "b"),
                (Syntax, ")"),
            ]),
            ("x\r;\r", vec![(Identifier, "x")]),
        ];

        for (source, expected) in test_cases {
            let expected: Vec<(TokenKind, String)> = expected
                .into_iter()
                .map(|(kind, text)| (kind, text.to_owned()))
                .collect();
            assert_eq!(kinds_and_text(source), expected, "lexing {source:?}");
        }
    }

    #[test]
    fn test_lex_locations_count_code_points() {
        let tokens = lex("(é 12)\n(x)");
        let locations: Vec<usize> = tokens.iter().map(|t| t.location).collect();
        assert_eq!(locations, vec![0, 1, 3, 5, 7, 8, 9]);
    }

    #[test]
    fn test_lex_consumes_all_input() {
        let tokens = lex("; c\r(\n\u{0}y 1");
        let texts: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(texts, vec!["\u{0}y", "1"]);
        let locations: Vec<usize> = tokens.iter().map(|t| t.location).collect();
        assert_eq!(locations, vec![6, 9]);
    }

    #[test]
    fn test_line_col() {
        let source = "(a\n  b)\n";
        assert_eq!(line_col(source, 0), (1, 1));
        assert_eq!(line_col(source, 1), (1, 2));
        assert_eq!(line_col(source, 5), (2, 3));
        assert_eq!(line_col(source, 100), (3, 1));
    }
}
