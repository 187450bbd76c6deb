//! Integration tests for alternative-tree expansion and branching-fraction
//! propagation.

use std::sync::Arc;

use graphphys::domain::lookup::DecayMode;
use graphphys::domain::params::params;
use graphphys::domain::{
    AlternativeTree, DecayTree, DomainError, InMemoryDatabase, NullDatabase, ParticleDatabase,
    ParticleId, Params, ProcessGroup, DEFAULT_MAX_ALTERNATIVES, MAX_TREE_DEPTH,
};
use graphphys::util::testing;

fn build_with(source: &str, database: Arc<dyn ParticleDatabase>) -> ProcessGroup {
    graphphys::parse(source, database).expect("document builds")
}

fn build(source: &str) -> ProcessGroup {
    build_with(source, Arc::new(NullDatabase))
}

fn expand(group: &mut ProcessGroup) -> Vec<AlternativeTree> {
    let root = group[0];
    group
        .tree_mut()
        .split_alternative_trees(root, DEFAULT_MAX_ALTERNATIVES)
        .expect("expansion succeeds")
}

/// Every non-leaf particle below `root` has exactly one decay.
fn is_resolved(tree: &DecayTree, root: ParticleId) -> bool {
    tree.subtree(root).all(|(_, p)| p.decays().len() <= 1)
}

/// Product types of the single decay of `root`.
fn product_types(tree: &DecayTree, root: ParticleId) -> Vec<String> {
    let particle = tree.particle(root).unwrap();
    let decay = tree.decay(particle.decays()[0]).unwrap();
    decay
        .iter()
        .map(|&p| tree.particle(p).unwrap().type_name().to_string())
        .collect()
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("probability known");
    assert!((actual - expected).abs() < 1e-12, "{actual} != {expected}");
}

#[test]
fn given_two_decays_when_expanding_then_one_clone_per_decay() {
    testing::init_test_setup();

    // Arrange
    let mut group = build("A -> {B}; A -> {C};");
    let original = group[0];

    // Act
    let trees = expand(&mut group);

    // Assert
    let tree = group.tree();
    assert_eq!(trees.len(), 2);
    for alternative in &trees {
        assert_ne!(alternative.root, original);
        assert_eq!(tree.particle(alternative.root).unwrap().type_name(), "A");
        assert_eq!(tree.particle(alternative.root).unwrap().decays().len(), 1);
        assert_eq!(alternative.probability, None);
    }
    assert_eq!(product_types(tree, trees[0].root), vec!["B"]);
    assert_eq!(product_types(tree, trees[1].root), vec!["C"]);
    assert_eq!(tree.particle(original).unwrap().decays().len(), 2);
}

#[test]
fn given_nested_alternatives_when_expanding_then_cartesian_product_with_probabilities() {
    // Arrange
    let source = r#"
        A -> {B C} [fraction=0.5];
        A -> {D} [fraction=0.5];
        B -> {b1} [fraction=0.2];
        B -> {b2} [fraction=0.8];
        C -> {c1};
        C -> {c2} [fraction=1.0];
    "#;
    let mut group = build(source);
    let root = group[0];
    assert_eq!(group.tree().count_alternative_trees(root).unwrap(), 5);

    // Act
    let trees = expand(&mut group);

    // Assert
    let tree = group.tree();
    assert_eq!(trees.len(), 5);
    assert!(trees.iter().all(|t| is_resolved(tree, t.root)));

    let described: Vec<(Vec<String>, Option<f64>)> = trees
        .iter()
        .map(|t| {
            let leaves = tree
                .subtree(t.root)
                .filter(|(_, p)| p.is_leaf())
                .map(|(_, p)| p.type_name().to_string())
                .collect();
            (leaves, t.probability)
        })
        .collect();
    assert_eq!(described[0], (vec!["b1".to_string(), "c1".to_string()], None));
    assert_eq!(described[1].0, vec!["b1", "c2"]);
    assert_close(described[1].1, 0.1);
    assert_eq!(described[2], (vec!["b2".to_string(), "c1".to_string()], None));
    assert_close(described[3].1, 0.4);
    assert_eq!(described[4].0, vec!["D"]);
    assert_close(described[4].1, 0.5);
}

#[test]
fn given_nested_alternatives_when_expanding_then_intermediate_clones_are_discarded() {
    let source = "A -> {B C}; A -> {D}; B -> {b1}; B -> {b2}; C -> {c1}; C -> {c2}";
    let mut group = build(source);
    assert_eq!(group.tree().particle_count(), 8);

    let trees = expand(&mut group);

    // originals, four 5-particle trees and one 2-particle tree
    assert_eq!(trees.len(), 5);
    assert_eq!(group.tree().particle_count(), 8 + 4 * 5 + 2);
}

#[test]
fn given_leaf_products_when_counting_then_sum_of_products() {
    let group = build("A -> {B C}; A -> {D E}; B -> {x}; B -> {y}; B -> {z}; E -> {u}; E -> {v}");

    let count = group.tree().count_alternative_trees(group[0]).unwrap();

    // 3 * 1 + 1 * 2
    assert_eq!(count, 5);
}

#[test]
fn given_database_fractions_when_expanding_then_used_where_params_are_silent() {
    // Arrange
    let mut db = InMemoryDatabase::new();
    for name in ["D0", "K-", "pi+", "pi-"] {
        db.add_particle(name, Params::new());
    }
    db.add_decay_mode(DecayMode {
        initial: "D0".into(),
        products: vec!["K-".into(), "pi+".into()],
        branching_fraction: Some(0.0389),
        angular_momentum: None,
        attributes: Params::new(),
    });
    let source = r#"
        k [type="K-"]; pi1 [type="pi+"]; pi2 [type="pi+"]; pi3 [type="pi-"];
        D0 -> {k pi1};
        D0 -> {pi2 pi3} [fraction=0.00145]
    "#;
    let mut group = build_with(source, Arc::new(db));

    // Act
    let trees = expand(&mut group);

    // Assert
    assert_close(trees[0].probability, 0.0389);
    assert_close(trees[1].probability, 0.00145);
}

#[test]
fn given_generic_decay_when_expanding_then_counts_as_one_alternative() {
    let mut group = build("X -> {} [fraction=0.3]; X -> {Y} [fraction=0.7]");

    let trees = expand(&mut group);

    let tree = group.tree();
    assert_eq!(trees.len(), 2);
    assert!(product_types(tree, trees[0].root).is_empty());
    assert_close(trees[0].probability, 0.3);
    assert_close(trees[1].probability, 0.7);
}

#[test]
fn given_limit_below_count_when_expanding_then_too_many_alternatives() {
    let mut group = build("A -> {B C}; B -> {x}; B -> {y}; C -> {u}; C -> {v}");
    let root = group[0];
    let before = group.tree().particle_count();

    let err = group
        .tree_mut()
        .split_alternative_trees(root, 3)
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::TooManyAlternatives {
            count: 4,
            limit: 3,
            ..
        }
    ));
    assert_eq!(group.tree().particle_count(), before);
}

#[test]
fn given_params_on_decays_when_expanding_then_clones_keep_them() {
    let mut group = build("A -> {B} [model=PHSP, fraction=1]");

    let trees = expand(&mut group);

    let tree = group.tree();
    let decay = tree.particle(trees[0].root).unwrap().decays()[0];
    assert_eq!(
        tree.decay(decay).unwrap().params(),
        &params([("model", "PHSP".into()), ("fraction", "1".into())])
    );
    assert_close(trees[0].probability, 1.0);
}

#[test]
fn given_chain_past_depth_limit_when_expanding_then_too_deep() {
    let mut tree = DecayTree::new();
    let root = testing::add_chain(&mut tree, 500);
    let before = tree.particle_count();

    let err = tree
        .split_alternative_trees(root, DEFAULT_MAX_ALTERNATIVES)
        .unwrap_err();

    assert!(matches!(err, DomainError::TooDeep { depth: 500, .. }));
    assert!(matches!(
        tree.count_alternative_trees(root),
        Err(DomainError::TooDeep { .. })
    ));
    assert_eq!(tree.particle_count(), before);
}

#[test]
fn given_chain_at_depth_limit_when_expanding_then_single_tree() {
    let mut tree = DecayTree::new();
    let root = testing::add_chain(&mut tree, MAX_TREE_DEPTH);

    let trees = tree.split_alternative_trees(root, 1).unwrap();

    assert_eq!(trees.len(), 1);
    assert_eq!(tree.depth(trees[0].root).unwrap(), MAX_TREE_DEPTH);
    assert_eq!(trees[0].probability, None);
}
