//! GraphPhys: a small language for describing particle decay trees.
//!
//! Documents are parsed into a [`domain::ProcessGroup`], which owns a
//! [`domain::DecayTree`] arena of particles and decays. From there a group
//! can be re-emitted as text, rendered, or expanded into every alternative
//! tree together with its branching fraction.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod parser;
pub mod util;

use std::sync::Arc;

use application::ApplicationResult;
use domain::{ParticleDatabase, ProcessGroup, TreeBuilder};

/// Parse `source` into a process group whose trees consult `database`.
pub fn parse(source: &str, database: Arc<dyn ParticleDatabase>) -> ApplicationResult<ProcessGroup> {
    let statements = parser::parse_document(source)?;
    Ok(TreeBuilder::with_database(database).build(&statements)?)
}
