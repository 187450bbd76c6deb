//! Grammar errors.

use nom::error::{ContextError, ErrorKind, ParseError};
use thiserror::Error;

use crate::domain::statement::Position;

/// A document that does not match the grammar. The document is rejected
/// as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("syntax error at line {line}, column {column}: expected {expected}, found {found}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub expected: String,
    pub found: String,
}

impl SyntaxError {
    pub(crate) fn at(source: &str, remaining: &str, expected: impl Into<String>) -> Self {
        let Position { line, column } = Position::locate(source, remaining);
        Self {
            line,
            column,
            expected: expected.into(),
            found: excerpt(remaining),
        }
    }

    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }
}

fn excerpt(remaining: &str) -> String {
    let token: String = remaining
        .chars()
        .take_while(|c| !c.is_whitespace())
        .take(16)
        .collect();
    if token.is_empty() {
        if remaining.is_empty() {
            "end of input".to_string()
        } else {
            "whitespace".to_string()
        }
    } else {
        format!("'{token}'")
    }
}

/// nom error keeping the furthest failure across alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarError<'a> {
    pub input: &'a str,
    pub expected: String,
}

impl<'a> GrammarError<'a> {
    pub fn new(input: &'a str, expected: impl Into<String>) -> Self {
        Self {
            input,
            expected: expected.into(),
        }
    }

    pub(crate) fn into_syntax_error(self, source: &str) -> SyntaxError {
        SyntaxError::at(source, self.input, self.expected)
    }
}

fn describe(kind: ErrorKind) -> String {
    match kind {
        ErrorKind::TakeWhile1 | ErrorKind::Alt => "identifier".to_string(),
        ErrorKind::Eof => "end of input".to_string(),
        ErrorKind::TakeUntil => "end of block comment".to_string(),
        other => other.description().to_lowercase(),
    }
}

impl<'a> ParseError<&'a str> for GrammarError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self::new(input, describe(kind))
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn from_char(input: &'a str, c: char) -> Self {
        Self::new(input, format!("'{c}'"))
    }

    fn or(self, other: Self) -> Self {
        // Less remaining input means the alternative got further
        if other.input.len() <= self.input.len() {
            other
        } else {
            self
        }
    }
}

impl<'a> ContextError<&'a str> for GrammarError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, other: Self) -> Self {
        if other.input.len() == input.len() {
            Self::new(input, ctx)
        } else {
            other
        }
    }
}
