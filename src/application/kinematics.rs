//! Kinematic sanity check: decays whose products outweigh their parent.

use tracing::{debug, instrument};

use crate::domain::{DecayId, DecayTree, DomainError, DomainResult, ParticleId, ProcessGroup};

/// Attribute holding a particle's mass, read through [`DecayTree::get`].
pub const MASS_ATTRIBUTE: &str = "mass";

#[derive(Debug, Clone, PartialEq)]
pub struct ImpossibleDecay {
    pub parent: ParticleId,
    pub decay: DecayId,
    pub parent_mass: f64,
    pub product_mass: f64,
}

fn mass(tree: &DecayTree, id: ParticleId) -> DomainResult<f64> {
    let value = tree.get(id, MASS_ATTRIBUTE)?;
    value.as_f64().ok_or_else(|| DomainError::InvalidParam {
        name: MASS_ATTRIBUTE.to_string(),
        reason: format!("'{value}' on {} is not a number", tree.label(id)),
    })
}

/// Every decay below the group's roots whose summed product masses exceed
/// the parent mass. Generic decays (no products) are skipped; a particle
/// without a mass is an error.
#[instrument(level = "debug", skip(group))]
pub fn find_impossible_decays(group: &ProcessGroup) -> DomainResult<Vec<ImpossibleDecay>> {
    let tree = group.tree();
    let mut found = Vec::new();
    for &root in group.root_particles() {
        for (parent, particle) in tree.subtree(root) {
            for &decay in particle.decays() {
                let products = tree.decay_ref(decay)?.products();
                if products.is_empty() {
                    continue;
                }
                let parent_mass = mass(tree, parent)?;
                let product_mass = products
                    .iter()
                    .map(|&p| mass(tree, p))
                    .sum::<DomainResult<f64>>()?;
                if product_mass > parent_mass {
                    debug!(
                        "{}: {} < {}",
                        particle.type_name(),
                        parent_mass,
                        product_mass
                    );
                    found.push(ImpossibleDecay {
                        parent,
                        decay,
                        parent_mass,
                        product_mass,
                    });
                }
            }
        }
    }
    Ok(found)
}
