//! Parse results: the statements of a GraphPhys document, in source order.

use std::fmt;

use crate::domain::params::{ParamValue, Params};

/// 1-based line and column of a statement or failure in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Position of `remaining` within `source`, where `remaining` is a suffix
    /// of `source`.
    pub fn locate(source: &str, remaining: &str) -> Self {
        let offset = source.len().saturating_sub(remaining.len());
        let consumed = source.get(..offset).unwrap_or(source);
        let line = consumed.matches('\n').count() + 1;
        let column = consumed
            .rsplit('\n')
            .next()
            .map_or(0, |last| last.chars().count())
            + 1;
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Which entities a default statement applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultScope {
    Particle,
    Decay,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `name [params]`: declare or annotate a particle
    Node { name: String, params: Params },
    /// `source -> { targets } [params]`: declare a decay
    Edge {
        source: String,
        targets: Vec<String>,
        params: Params,
    },
    /// `particle [params]` / `decay [params]`: defaults for what follows
    Default { scope: DefaultScope, params: Params },
    /// `name = value`: document-wide parameter
    Param { name: String, value: ParamValue },
}

/// A value tagged with where it starts in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Located<T> {
    pub position: Position,
    pub value: T,
}

impl<T> Located<T> {
    pub fn new(position: Position, value: T) -> Self {
        Self { position, value }
    }
}
