//! Integration tests for writing process groups back out as documents.

use std::sync::Arc;

use graphphys::application::emit;
use graphphys::application::render::particle_tree;
use graphphys::domain::{
    DecayTree, DomainError, ElementRef, NullDatabase, Params, ParticleId, ProcessGroup,
    MAX_TREE_DEPTH,
};
use graphphys::util::testing::add_chain;
use rstest::rstest;

/// Structure of a particle subtree, independent of arena handles.
#[derive(Debug, PartialEq)]
struct Shape {
    type_name: String,
    params: Params,
    decays: Vec<(Params, Vec<Shape>)>,
}

fn shape(tree: &DecayTree, id: ParticleId) -> Shape {
    let particle = tree.particle(id).unwrap();
    Shape {
        type_name: particle.type_name().to_string(),
        params: particle.params().clone(),
        decays: particle
            .decays()
            .iter()
            .map(|&d| {
                let decay = tree.decay(d).unwrap();
                let products = decay.iter().map(|&p| shape(tree, p)).collect();
                (decay.params().clone(), products)
            })
            .collect(),
    }
}

fn shapes(group: &ProcessGroup) -> Vec<Shape> {
    group.iter().map(|&root| shape(group.tree(), root)).collect()
}

fn parse(source: &str) -> ProcessGroup {
    graphphys::parse(source, Arc::new(NullDatabase)).expect("document builds")
}

#[rstest]
#[case("A -> { B C }; B [mass=1]; C [mass=2];")]
#[case("X -> {Y}; Z [foo=1];")]
#[case("A -> {B}; A -> {C} [fraction=0.25];")]
#[case("pi1 [type=\"pi+\"]; pi2 [type=\"pi+\"]; rho0 -> {pi1 pi2}")]
#[case("\"K S0\" -> {\"pi+\" \"pi-\"}; particle [charge=\"+1 e\"]; W")]
#[case("B0 -> {D*- e+ nu_e} [EvtGen=[Model=HQET, Params=[r=0.92]], semileptonic]")]
#[case("X -> {} [generic]; title = \"inclusive X\"; energy = 10.58")]
#[case("particle; decay -> {d1}")]
fn given_document_when_emitting_and_reparsing_then_isomorphic(#[case] source: &str) {
    // Arrange
    let original = parse(source);

    // Act
    let text = emit(&original, ElementRef::ProcessGroup).expect("emits");
    let reparsed = parse(&text);

    // Assert
    assert_eq!(shapes(&original), shapes(&reparsed), "emitted:\n{text}");
    assert_eq!(original.params(), reparsed.params());
}

#[test]
fn given_single_particle_when_emitting_then_only_its_subtree() {
    let group = parse("A -> {B}; C -> {D}");
    let c = group[1];

    let text = emit(&group, ElementRef::Particle(c)).unwrap();
    let reparsed = parse(&text);

    assert_eq!(reparsed.len(), 1);
    assert_eq!(shapes(&reparsed), vec![shape(group.tree(), c)]);
}

#[test]
fn given_decay_element_when_emitting_then_invalid_type() {
    let group = parse("A -> {B}");
    let decay = group.tree().particle(group[0]).unwrap().decays()[0];

    let err = emit(&group, ElementRef::Decay(decay)).unwrap_err();

    assert!(matches!(err, DomainError::InvalidType(_)));
}

#[test]
fn given_type_with_quote_when_emitting_then_rejected() {
    let mut group = ProcessGroup::new();
    let odd = group.tree_mut().add_particle("say \"hi\"", Params::new());
    group.add_root_particle(odd).unwrap();

    assert!(emit(&group, ElementRef::ProcessGroup).is_err());
}

#[test]
fn given_chain_past_depth_limit_when_emitting_or_rendering_then_too_deep() {
    let mut group = ProcessGroup::new();
    let root = add_chain(group.tree_mut(), MAX_TREE_DEPTH + 1);
    group.add_root_particle(root).unwrap();

    let emitted = emit(&group, ElementRef::ProcessGroup);
    let rendered = particle_tree(group.tree(), root);

    assert!(matches!(emitted, Err(DomainError::TooDeep { .. })));
    assert!(matches!(rendered, Err(DomainError::TooDeep { .. })));
}
