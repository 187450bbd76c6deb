/*
Terminal rendering of decay trees via termtree.

Particles become nodes labelled with their type and parameters; every decay
becomes an arrow node holding its products, so alternatives stay visible.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::{
    AlternativeTree, DecayId, DecayTree, DomainError, DomainResult, Params, ParticleId, ProcessGroup,
};

pub trait ToTermTree {
    fn to_term_tree(&self) -> DomainResult<Tree<String>>;
}

fn with_params(mut label: String, params: &Params) -> String {
    if !params.is_empty() {
        let rendered: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        label.push_str(&format!(" [{}]", rendered.join(", ")));
    }
    label
}

/// Format a branching-fraction product; unknown is spelled out.
pub fn format_probability(probability: Option<f64>) -> String {
    match probability {
        Some(p) => format!("{p:.6}"),
        None => "Unknown".to_string(),
    }
}

#[instrument(level = "trace", skip(tree))]
pub fn particle_tree(tree: &DecayTree, id: ParticleId) -> DomainResult<Tree<String>> {
    tree.check_depth(id)?;
    particle_node(tree, id)
}

fn particle_node(tree: &DecayTree, id: ParticleId) -> DomainResult<Tree<String>> {
    let particle = tree
        .particle(id)
        .ok_or_else(|| DomainError::UnknownParticle(format!("{id:?}")))?;
    let mut node = Tree::new(with_params(particle.type_name().to_string(), particle.params()));
    for &decay in particle.decays() {
        node.push(decay_tree(tree, decay)?);
    }
    Ok(node)
}

fn decay_tree(tree: &DecayTree, id: DecayId) -> DomainResult<Tree<String>> {
    let decay = tree.decay_ref(id)?;
    let leaves = decay
        .products()
        .iter()
        .map(|&p| particle_node(tree, p))
        .collect::<DomainResult<Vec<_>>>()?;
    Ok(Tree::new(with_params("→".to_string(), decay.params())).with_leaves(leaves))
}

impl ToTermTree for ProcessGroup {
    fn to_term_tree(&self) -> DomainResult<Tree<String>> {
        let mut root = Tree::new(with_params("ProcessGroup".to_string(), self.params()));
        for &particle in self.root_particles() {
            root.push(particle_tree(self.tree(), particle)?);
        }
        Ok(root)
    }
}

/// One node per alternative, labelled with its probability.
pub fn alternatives_tree(tree: &DecayTree, alternatives: &[AlternativeTree]) -> DomainResult<Tree<String>> {
    let mut root = Tree::new(format!("{} alternative trees", alternatives.len()));
    for alternative in alternatives {
        let mut node = particle_tree(tree, alternative.root)?;
        node.root = format!("{} (p = {})", node.root, format_probability(alternative.probability));
        root.push(node);
    }
    Ok(root)
}
