//! Statement grammar.
//!
//! ```text
//! stmt_list    := stmt (';' stmt)* ';'?
//! stmt         := default_stmt | param_stmt | edge_stmt | node_stmt
//! default_stmt := ('particle' | 'decay') param_list
//! param_stmt   := ID '=' value
//! edge_stmt    := ID '->' '{' ID* '}' param_list?
//! node_stmt    := ID param_list?
//! param_list   := '[' (ID ('=' value)? ','?)* ']'
//! value        := param_list | ID
//! ```
//!
//! Alternatives are tried in that order. Numeric literals are identifiers
//! as far as the grammar is concerned and keep their spelling. `//` and `#`
//! line comments and `/* */` block comments count as whitespace.

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, tag_no_case, take_until};
use nom::character::complete::{char, multispace1, satisfy};
use nom::combinator::{cut, map, not, opt, value};
use nom::error::context;
use nom::multi::{many0, many0_count};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::Parser;
use tracing::{debug, instrument, trace};

use crate::domain::params::{ParamValue, Params};
use crate::domain::statement::{DefaultScope, Located, Position, Statement};
use crate::parser::error::{GrammarError, SyntaxError};
use crate::parser::ident::identifier;
use crate::parser::PResult;

fn line_comment(input: &str) -> PResult<'_, ()> {
    value((), pair(alt((tag("//"), tag("#"))), opt(is_not("\r\n"))))(input)
}

fn block_comment(input: &str) -> PResult<'_, ()> {
    value(
        (),
        tuple((
            tag("/*"),
            cut(context("end of block comment", take_until("*/"))),
            tag("*/"),
        )),
    )(input)
}

/// Skip whitespace and comments.
pub fn sp(input: &str) -> PResult<'_, ()> {
    value(
        (),
        many0_count(alt((value((), multispace1), line_comment, block_comment))),
    )(input)
}

/// A combinator that takes a parser `inner` and produces a parser that also
/// consumes leading and trailing whitespace and comments, returning the
/// output of `inner`.
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: Parser<&'a str, O, GrammarError<'a>>,
{
    delimited(sp, inner, sp)
}

fn name(input: &str) -> PResult<'_, String> {
    map(identifier, str::to_string)(input)
}

/// Case-insensitive keyword not followed by an identifier character.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    terminated(
        tag_no_case(word),
        not(satisfy(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')),
    )
}

/// Deepest nesting of parameter lists inside one another.
pub const MAX_PARAM_DEPTH: usize = 64;

/// A value nested inside `depth` enclosing parameter lists.
fn param_value(input: &str, depth: usize) -> PResult<'_, ParamValue> {
    alt((
        map(|i| nested_param_list(i, depth + 1), ParamValue::Map),
        map(identifier, |s| ParamValue::Text(s.to_string())),
    ))(input)
}

/// `name` or `name = value`; a bare name gets [`ParamValue::FLAG`].
fn param(input: &str, depth: usize) -> PResult<'_, (String, ParamValue)> {
    let (input, key) = name(input)?;
    let (input, value) = opt(preceded(
        ws(char('=')),
        cut(context("parameter value", |i| param_value(i, depth))),
    ))(input)?;
    Ok((input, (key, value.unwrap_or(ParamValue::FLAG))))
}

/// `[a=1, b, c=[d=2]]`. Later duplicates override earlier ones.
pub fn param_list(input: &str) -> PResult<'_, Params> {
    nested_param_list(input, 1)
}

fn nested_param_list(input: &str, depth: usize) -> PResult<'_, Params> {
    let (input, _) = char('[')(input)?;
    if depth > MAX_PARAM_DEPTH {
        return Err(nom::Err::Failure(GrammarError::new(
            input,
            format!("at most {MAX_PARAM_DEPTH} nested parameter lists"),
        )));
    }
    let (input, pairs) = cut(many0(delimited(
        sp,
        |i| param(i, depth),
        pair(sp, opt(char(','))),
    )))(input)?;
    let (input, _) = cut(preceded(sp, context("']'", char(']'))))(input)?;
    Ok((input, pairs.into_iter().collect()))
}

fn default_stmt(input: &str) -> PResult<'_, Statement> {
    let scope = alt((
        value(DefaultScope::Particle, keyword("particle")),
        value(DefaultScope::Decay, keyword("decay")),
    ));
    map(pair(terminated(scope, sp), param_list), |(scope, params)| {
        Statement::Default { scope, params }
    })(input)
}

fn param_stmt(input: &str) -> PResult<'_, Statement> {
    let (input, name) = name(input)?;
    let (input, _) = ws(char('='))(input)?;
    let (input, value) = cut(context("parameter value", |i| param_value(i, 0)))(input)?;
    Ok((input, Statement::Param { name, value }))
}

fn edge_stmt(input: &str) -> PResult<'_, Statement> {
    let (input, source) = name(input)?;
    let (input, _) = preceded(sp, tag("->"))(input)?;
    let (input, targets) = cut(preceded(
        ws(context("'{'", char('{'))),
        many0(terminated(name, sp)),
    ))(input)?;
    let (input, _) = cut(context("'}'", char('}')))(input)?;
    let (input, params) = opt(preceded(sp, param_list))(input)?;
    Ok((
        input,
        Statement::Edge {
            source,
            targets,
            params: params.unwrap_or_default(),
        },
    ))
}

fn node_stmt(input: &str) -> PResult<'_, Statement> {
    let (input, name) = name(input)?;
    let (input, params) = opt(preceded(sp, param_list))(input)?;
    Ok((
        input,
        Statement::Node {
            name,
            params: params.unwrap_or_default(),
        },
    ))
}

pub fn statement(input: &str) -> PResult<'_, Statement> {
    context(
        "statement",
        alt((default_stmt, param_stmt, edge_stmt, node_stmt)),
    )(input)
}

fn to_syntax_error(source: &str, err: nom::Err<GrammarError<'_>>) -> SyntaxError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.into_syntax_error(source),
        nom::Err::Incomplete(_) => SyntaxError::at(source, "", "more input"),
    }
}

fn skip<'a>(source: &str, input: &'a str) -> Result<&'a str, SyntaxError> {
    sp(input)
        .map(|(rest, _)| rest)
        .map_err(|e| to_syntax_error(source, e))
}

/// Parse a whole document into its statements.
///
/// Any mismatch rejects the document; there are no partial results.
#[instrument(level = "debug", skip(source), fields(len = source.len()))]
pub fn parse_document(source: &str) -> Result<Vec<Located<Statement>>, SyntaxError> {
    let mut statements = Vec::new();
    let mut rest = skip(source, source)?;
    loop {
        let position = Position::locate(source, rest);
        let (after, parsed) = statement(rest).map_err(|e| to_syntax_error(source, e))?;
        trace!(%position, ?parsed, "statement");
        statements.push(Located::new(position, parsed));

        let after = skip(source, after)?;
        if after.is_empty() {
            break;
        }
        let (after, _) = char::<&str, GrammarError<'_>>(';')(after).map_err(|e| to_syntax_error(source, e))?;
        let after = skip(source, after)?;
        if after.is_empty() {
            break;
        }
        rest = after;
    }
    debug!("parsed {} statements", statements.len());
    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::params::params;

    fn values(source: &str) -> Vec<Statement> {
        parse_document(source)
            .unwrap()
            .into_iter()
            .map(|s| s.value)
            .collect()
    }

    #[test]
    fn given_nested_param_list_when_parsing_then_builds_nested_map() {
        let (rest, parsed) = param_list("[EvtGen=[Model=PHSP, Geo], fraction = 0.5, flag]").unwrap();

        assert_eq!(rest, "");
        let inner = params([("Model", "PHSP".into()), ("Geo", ParamValue::FLAG)]);
        assert_eq!(parsed["EvtGen"], ParamValue::Map(inner));
        assert_eq!(parsed["fraction"], ParamValue::from("0.5"));
        assert_eq!(parsed["flag"], ParamValue::FLAG);
    }

    #[test]
    fn given_comments_when_skipping_then_consumes_all_forms() {
        let (rest, _) = sp("  // line\n# hash\n/* block\n */  A").unwrap();
        assert_eq!(rest, "A");
    }

    #[test]
    fn given_each_statement_kind_when_parsing_then_classifies() {
        let parsed = values("particle [mass=1]; decay [model=PHSP]; title = test; A -> {B C} [fraction=0.1]; B [x]");

        assert!(matches!(
            parsed[0],
            Statement::Default {
                scope: DefaultScope::Particle,
                ..
            }
        ));
        assert!(matches!(
            parsed[1],
            Statement::Default {
                scope: DefaultScope::Decay,
                ..
            }
        ));
        assert_eq!(
            parsed[2],
            Statement::Param {
                name: "title".into(),
                value: "test".into()
            }
        );
        assert_eq!(
            parsed[3],
            Statement::Edge {
                source: "A".into(),
                targets: vec!["B".into(), "C".into()],
                params: params([("fraction", "0.1".into())]),
            }
        );
        assert_eq!(
            parsed[4],
            Statement::Node {
                name: "B".into(),
                params: params([("x", ParamValue::FLAG)]),
            }
        );
    }

    #[test]
    fn given_keyword_without_param_list_when_parsing_then_is_plain_name() {
        let parsed = values("decay -> {x}; Particle2");

        assert!(matches!(&parsed[0], Statement::Edge { source, .. } if source == "decay"));
        assert!(matches!(&parsed[1], Statement::Node { name, .. } if name == "Particle2"));
    }

    #[test]
    fn given_uppercase_keyword_when_parsing_then_is_default() {
        let parsed = values("PARTICLE [a=1]");
        assert!(matches!(parsed[0], Statement::Default { .. }));
    }

    #[test]
    fn given_missing_close_brace_when_parsing_then_reports_position() {
        let err = parse_document("A -> {B C;\n").unwrap_err();

        assert_eq!(err.line, 1);
        assert_eq!(err.column, 10);
        assert_eq!(err.expected, "'}'");
    }

    #[test]
    fn given_missing_separator_when_parsing_then_expects_semicolon() {
        let err = parse_document("A [x=1]\nB").unwrap_err();

        assert_eq!((err.line, err.column), (2, 1));
        assert_eq!(err.expected, "';'");
    }

    #[test]
    fn given_only_comments_when_parsing_then_error() {
        let err = parse_document("// nothing here\n").unwrap_err();
        assert_eq!(err.found, "end of input");
    }

    #[test]
    fn given_statements_when_parsing_then_records_positions() {
        let parsed = parse_document("A;\n  B -> {C};").unwrap();
        assert_eq!(parsed[1].position, Position { line: 2, column: 3 });
    }
}
