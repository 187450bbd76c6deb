//! Process group: the top-level container of one parsed document.

use std::ops::Index;
use std::sync::Arc;

use tracing::instrument;

use crate::domain::arena::{DecayTree, ParticleId};
use crate::domain::error::{ConsistencyError, DomainError, DomainResult};
use crate::domain::lookup::ParticleDatabase;
use crate::domain::params::{ParamValue, Params};

/// Independent root particles plus document-wide parameters.
///
/// The group owns the [`DecayTree`] arena all of its particles live in.
#[derive(Debug, Clone, Default)]
pub struct ProcessGroup {
    tree: DecayTree,
    root_particles: Vec<ParticleId>,
    params: Params,
}

impl ProcessGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(database: Arc<dyn ParticleDatabase>) -> Self {
        Self::from_tree(DecayTree::with_database(database))
    }

    pub fn from_tree(tree: DecayTree) -> Self {
        Self {
            tree,
            root_particles: Vec::new(),
            params: Params::new(),
        }
    }

    pub fn tree(&self) -> &DecayTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DecayTree {
        &mut self.tree
    }

    pub fn root_particles(&self) -> &[ParticleId] {
        &self.root_particles
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.root_particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root_particles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParticleId> {
        self.root_particles.iter()
    }

    /// Register `particle` as a root.
    ///
    /// The handle must belong to this group's tree and the particle must not
    /// be the product of a decay.
    #[instrument(level = "debug", skip(self))]
    pub fn add_root_particle(&mut self, particle: ParticleId) -> DomainResult<()> {
        let node = self.tree.particle(particle).ok_or_else(|| {
            DomainError::InvalidType(format!("{particle:?} is not a particle of this process group"))
        })?;
        if node.parent().is_some() {
            return Err(ConsistencyError::RootHasParent {
                particle: node.type_name().to_string(),
            }
            .into());
        }
        self.root_particles.push(particle);
        Ok(())
    }

    pub fn add_param(&mut self, name: impl Into<String>, value: ParamValue) {
        self.params.insert(name.into(), value);
    }
}

impl Index<usize> for ProcessGroup {
    type Output = ParticleId;

    fn index(&self, index: usize) -> &Self::Output {
        &self.root_particles[index]
    }
}

impl<'a> IntoIterator for &'a ProcessGroup {
    type Item = &'a ParticleId;
    type IntoIter = std::slice::Iter<'a, ParticleId>;

    fn into_iter(self) -> Self::IntoIter {
        self.root_particles.iter()
    }
}
