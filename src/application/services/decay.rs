//! Decay document service
//!
//! The adapter between external inputs (text buffers, files) and the model:
//! parses documents into process groups and runs the converters over them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::emitter;
use crate::application::kinematics::{self, ImpossibleDecay};
use crate::application::render::{self, ToTermTree};
use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{AlternativeTree, ElementRef, ParticleDatabase, ParticleId, ProcessGroup, TreeBuilder};
use crate::infrastructure::traits::FileSystem;
use crate::parser::parse_document;

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Text(String),
    File(PathBuf),
}

impl From<&Path> for DocumentSource {
    fn from(path: &Path) -> Self {
        DocumentSource::File(path.to_path_buf())
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        DocumentSource::File(path)
    }
}

/// Alternatives of one root particle.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub root: ParticleId,
    pub alternatives: Vec<AlternativeTree>,
}

/// Service for loading, expanding and converting decay documents.
pub struct DecayService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
    database: Arc<dyn ParticleDatabase>,
}

impl DecayService {
    /// Create a new decay service.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        settings: Arc<Settings>,
        database: Arc<dyn ParticleDatabase>,
    ) -> Self {
        Self {
            fs,
            settings,
            database,
        }
    }

    fn read(&self, source: &DocumentSource) -> ApplicationResult<String> {
        match source {
            DocumentSource::Text(text) => Ok(text.clone()),
            DocumentSource::File(path) => self.fs.read_to_string(path).or_document_not_found(path),
        }
    }

    /// Parse a document and build its process group.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, source: &DocumentSource) -> ApplicationResult<ProcessGroup> {
        let text = self.read(source)?;
        let statements = parse_document(&text)?;
        let group = TreeBuilder::with_database(self.database.clone()).build(&statements)?;
        debug!("loaded {} root particles", group.len());
        Ok(group)
    }

    /// GraphPhys text for the whole group.
    pub fn emit(&self, group: &ProcessGroup) -> ApplicationResult<String> {
        Ok(emitter::emit(group, ElementRef::ProcessGroup)?)
    }

    /// Write emitted text to `path`.
    pub fn write(&self, path: &Path, text: &str) -> ApplicationResult<()> {
        self.fs.write(path, text).with_path_context("write document", path)
    }

    /// Expand every root of `group` into its alternative trees.
    ///
    /// `limit` overrides the configured ceiling.
    #[instrument(level = "debug", skip(self, group))]
    pub fn expand(&self, group: &mut ProcessGroup, limit: Option<usize>) -> ApplicationResult<Vec<Expansion>> {
        let limit = limit.unwrap_or(self.settings.max_alternatives);
        let roots = group.root_particles().to_vec();
        let mut expansions = Vec::with_capacity(roots.len());
        for root in roots {
            let alternatives = group.tree_mut().split_alternative_trees(root, limit)?;
            expansions.push(Expansion { root, alternatives });
        }
        Ok(expansions)
    }

    pub fn render(&self, group: &ProcessGroup) -> ApplicationResult<String> {
        Ok(group.to_term_tree()?.to_string())
    }

    pub fn render_expansion(&self, group: &ProcessGroup, expansion: &Expansion) -> ApplicationResult<String> {
        Ok(render::alternatives_tree(group.tree(), &expansion.alternatives)?.to_string())
    }

    pub fn kinematics(&self, group: &ProcessGroup) -> ApplicationResult<Vec<ImpossibleDecay>> {
        Ok(kinematics::find_impossible_decays(group)?)
    }
}
