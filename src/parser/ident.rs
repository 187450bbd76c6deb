//! Lexical rule for GraphPhys identifiers.
//!
//! A bare identifier is a run of ASCII alphanumerics and the punctuation in
//! [`ID_PUNCTUATION`], which may be interrupted by `-` as long as the dash
//! does not start the arrow `->`. Anything else must be written as a
//! double-quoted string; quoted strings have no escapes and cannot span lines.

use std::borrow::Cow;

use nom::branch::alt;
use nom::bytes::complete::{take_while, take_while1};
use nom::character::complete::char;
use nom::combinator::{all_consuming, not, opt, recognize};
use nom::error::context;
use nom::multi::many0_count;
use nom::sequence::{delimited, pair, preceded, terminated};

use crate::parser::PResult;

/// Punctuation allowed in bare identifiers, besides interior dashes.
pub const ID_PUNCTUATION: &str = "`~!@$%^&*()_+|\\/<>.:?";

/// Keywords introducing default statements (matched case-insensitively).
pub const KEYWORDS: [&str; 2] = ["particle", "decay"];

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ID_PUNCTUATION.contains(c)
}

fn chunk(input: &str) -> PResult<'_, &str> {
    take_while1(is_id_char)(input)
}

/// A `-` that is not the start of `->`.
fn lone_dash(input: &str) -> PResult<'_, char> {
    terminated(char('-'), not(char('>')))(input)
}

fn continuation(input: &str) -> PResult<'_, &str> {
    recognize(many0_count(pair(lone_dash, opt(chunk))))(input)
}

/// Unquoted identifier, e.g. `K*(892)0`, `nu(e)`, `-1.5e-3`.
pub fn bare_id(input: &str) -> PResult<'_, &str> {
    context(
        "identifier",
        recognize(alt((
            pair(chunk, continuation),
            pair(
                recognize(pair(char('-'), opt(preceded(not(char('>')), chunk)))),
                continuation,
            ),
        ))),
    )(input)
}

/// Double-quoted identifier; yields the text between the quotes.
pub fn quoted_id(input: &str) -> PResult<'_, &str> {
    delimited(
        char('"'),
        take_while(|c: char| c != '"' && c != '\n' && c != '\r'),
        context("closing '\"'", char('"')),
    )(input)
}

/// Bare or quoted identifier.
pub fn identifier(input: &str) -> PResult<'_, &str> {
    context("identifier", alt((quoted_id, bare_id)))(input)
}

/// True iff the whole of `name` is one identifier (bare or quoted).
pub fn is_valid_id(name: &str) -> bool {
    all_consuming(identifier)(name).is_ok()
}

/// True iff `name` can be written without quotes.
pub fn is_bare_id(name: &str) -> bool {
    all_consuming(bare_id)(name).is_ok()
}

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(name))
}

/// `name` as it must appear in a document: unchanged when it is a bare
/// identifier, quoted otherwise. `None` if no spelling reads back as `name`
/// (it contains a double quote or a line break).
pub fn quote_if_necessary(name: &str) -> Option<Cow<'_, str>> {
    if is_bare_id(name) && !is_keyword(name) {
        return Some(Cow::Borrowed(name));
    }
    if name.contains(|c: char| matches!(c, '"' | '\n' | '\r')) {
        return None;
    }
    Some(Cow::Owned(format!("\"{name}\"")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pi+")]
    #[case("K*(892)0")]
    #[case("nu(e)")]
    #[case("anti-K0")]
    #[case("-1.5e-3")]
    #[case("5.0:5.5")]
    #[case("a-")]
    #[case("\"D0 -> K- pi+\"")]
    #[case("\"\"")]
    fn given_identifier_when_validating_then_accepts(#[case] name: &str) {
        assert!(is_valid_id(name), "{name} should be valid");
    }

    #[rstest]
    #[case("")]
    #[case("a->b")]
    #[case("->")]
    #[case("a b")]
    #[case("a;b")]
    #[case("a=b")]
    #[case("[a]")]
    #[case("{a}")]
    #[case("a,b")]
    #[case("\"open")]
    #[case("\"two\nlines\"")]
    fn given_non_identifier_when_validating_then_rejects(#[case] name: &str) {
        assert!(!is_valid_id(name), "{name:?} should be invalid");
    }

    #[test]
    fn given_dash_before_arrow_when_parsing_bare_id_then_stops_before_arrow() {
        let (rest, id) = bare_id("B0-->x").unwrap();
        assert_eq!(id, "B0-");
        assert_eq!(rest, "->x");
    }

    #[test]
    fn given_quoted_id_when_parsing_then_strips_quotes() {
        let (rest, id) = identifier("\"J/psi (1S)\" rest").unwrap();
        assert_eq!(id, "J/psi (1S)");
        assert_eq!(rest, " rest");
    }

    #[rstest]
    #[case("pi+", "pi+")]
    #[case("D0 bar", "\"D0 bar\"")]
    #[case("particle", "\"particle\"")]
    #[case("a->b", "\"a->b\"")]
    fn given_name_when_quoting_then_quotes_only_when_needed(#[case] name: &str, #[case] expected: &str) {
        let quoted = quote_if_necessary(name).unwrap();
        assert_eq!(quoted, expected);
        assert!(is_valid_id(&quoted));
    }

    #[test]
    fn given_name_with_quote_when_quoting_then_none() {
        assert_eq!(quote_if_necessary("say \"hi\""), None);
    }
}
