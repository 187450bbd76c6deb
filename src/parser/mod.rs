//! GraphPhys grammar, written with nom combinators.
//!
//! Parsing turns text into [`Statement`](crate::domain::Statement)s;
//! [`TreeBuilder`](crate::domain::TreeBuilder) turns those into a model.

pub mod error;
pub mod grammar;
pub mod ident;

use nom::IResult;

pub use error::{GrammarError, SyntaxError};
pub use grammar::{param_list, parse_document, MAX_PARAM_DEPTH};
pub use ident::{is_bare_id, is_keyword, is_valid_id, quote_if_necessary};

/// Result of a grammar combinator.
pub type PResult<'a, T> = IResult<&'a str, T, GrammarError<'a>>;
