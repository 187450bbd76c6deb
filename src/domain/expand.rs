//! Alternative-tree expansion.
//!
//! A particle with several decays describes several hypotheses at once.
//! Expansion enumerates every combination of decay choices as an independent
//! tree with exactly one decay per non-leaf particle.

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::arena::{DecayTree, ParticleId};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::params::Params;

/// Default ceiling on the number of trees one expansion may produce.
pub const DEFAULT_MAX_ALTERNATIVES: usize = 10_000;

/// One fully-resolved combination of decay choices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlternativeTree {
    /// Root of the resolved tree; a fresh clone unless the particle was a leaf
    pub root: ParticleId,
    /// Product of the branching fractions along the tree, `None` if any is unknown
    pub probability: Option<f64>,
}

/// Multiply two probabilities; unknown absorbs.
pub fn combine(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? * b?)
}

impl DecayTree {
    /// Number of trees [`DecayTree::split_alternative_trees`] would return:
    /// 1 for a leaf, otherwise the sum over decays of the product of the
    /// products' counts. Saturates instead of overflowing.
    pub fn count_alternative_trees(&self, id: ParticleId) -> DomainResult<u128> {
        self.check_depth(id)?;
        self.count(id)
    }

    fn count(&self, id: ParticleId) -> DomainResult<u128> {
        let particle = self.particle_ref(id)?;
        if particle.is_leaf() {
            return Ok(1);
        }
        let mut total: u128 = 0;
        for &decay in particle.decays() {
            let mut combinations: u128 = 1;
            for &product in self.decay_ref(decay)?.products() {
                combinations = combinations.saturating_mul(self.count(product)?);
            }
            total = total.saturating_add(combinations);
        }
        Ok(total)
    }

    /// Expand `root` into all of its alternative trees.
    ///
    /// A leaf yields itself with probability 1. Otherwise every decay of
    /// `root` contributes the cartesian product of its products' own
    /// alternatives; each combination becomes a new root clone carrying a
    /// single decay over deep clones of the chosen products, weighted by
    /// `fraction * product of chosen probabilities`.
    ///
    /// The result grows as the product of branch counts down the tree, so the
    /// count is checked against `limit` before anything is cloned. Trees
    /// deeper than [`MAX_TREE_DEPTH`](crate::domain::MAX_TREE_DEPTH) are
    /// rejected up front.
    #[instrument(level = "debug", skip(self))]
    pub fn split_alternative_trees(
        &mut self,
        root: ParticleId,
        limit: usize,
    ) -> DomainResult<Vec<AlternativeTree>> {
        let count = self.count_alternative_trees(root)?;
        if count > limit as u128 {
            return Err(DomainError::TooManyAlternatives {
                particle: self.label(root),
                count,
                limit,
            });
        }
        let trees = self.split(root)?;
        debug!("expanded {} into {} alternative trees", self.label(root), trees.len());
        Ok(trees)
    }

    fn split(&mut self, id: ParticleId) -> DomainResult<Vec<AlternativeTree>> {
        let decays = self.particle_ref(id)?.decays().to_vec();
        if decays.is_empty() {
            return Ok(vec![AlternativeTree {
                root: id,
                probability: Some(1.0),
            }]);
        }

        let mut result = Vec::new();
        for decay in decays {
            let fraction = self.branching_fraction(decay)?;
            let source = self.decay_ref(decay)?;
            let products = source.products().to_vec();
            let params = source.params().clone();

            let per_product = products
                .iter()
                .map(|&p| self.split(p))
                .collect::<DomainResult<Vec<_>>>()?;

            let combinations: Vec<Vec<AlternativeTree>> = if per_product.is_empty() {
                vec![Vec::new()]
            } else {
                per_product
                    .iter()
                    .map(|alternatives| alternatives.iter().copied())
                    .multi_cartesian_product()
                    .collect()
            };

            for combination in combinations {
                result.push(self.resolve(id, &combination, fraction, &params)?);
            }

            // Intermediate clones have been copied into the results
            for (alternatives, &product) in per_product.iter().zip(&products) {
                for alternative in alternatives.iter().filter(|a| a.root != product) {
                    self.discard(alternative.root)?;
                }
            }
        }
        Ok(result)
    }

    fn resolve(
        &mut self,
        id: ParticleId,
        combination: &[AlternativeTree],
        fraction: Option<f64>,
        params: &Params,
    ) -> DomainResult<AlternativeTree> {
        let root = self.clone_particle(id, false)?;
        let mut chosen = Vec::with_capacity(combination.len());
        let mut probability = fraction;
        for alternative in combination {
            chosen.push(self.clone_particle(alternative.root, true)?);
            probability = combine(probability, alternative.probability);
        }
        let decay = self.new_decay(chosen, params.clone())?;
        self.add_decay(root, decay, Params::new())?;
        Ok(AlternativeTree { root, probability })
    }
}
