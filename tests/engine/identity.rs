//! Integration tests for structural identity across analyses

use std::ptr;

use prism_engine::projections::{FinalState, Selection};
use prism_engine::{Event, Filter, ProjectionRegistry};
use prism_foundation::{PdgId, Quantity};

use crate::lepton_event;

fn electrons(abs_eta_max: f64) -> Filter {
    Filter::abs_ids([PdgId::ELECTRON])
        .and(Filter::kinematic(Quantity::Pt, 25.0, f64::INFINITY).unwrap())
        .and(Filter::kinematic(Quantity::AbsEta, 0.0, abs_eta_max).unwrap())
}

#[test]
fn identical_selections_from_two_analyses_share_a_value() {
    let mut registry = ProjectionRegistry::new();

    // First analysis.
    let fs_a = registry.register_as("A/fs", FinalState::new()).unwrap();
    let tight_a = registry
        .register_as("A/electrons", Selection::new(fs_a, electrons(2.47)).unwrap())
        .unwrap();

    // Second analysis, same configuration built independently.
    let fs_b = registry.register_as("B/fs", FinalState::new()).unwrap();
    let tight_b = registry
        .register_as("B/electrons", Selection::new(fs_b, electrons(2.47)).unwrap())
        .unwrap();

    // Third analysis, slightly wider acceptance.
    let loose = registry
        .register_as("C/electrons", Selection::new(fs_b, electrons(2.5)).unwrap())
        .unwrap();

    let graph = registry.seal().unwrap();
    assert!(graph.equivalent(tight_a, tight_b).unwrap());
    assert!(!graph.equivalent(tight_a, loose).unwrap());
    assert_eq!(graph.identity_count(), 3);

    let event = Event::new(&graph, lepton_event(1));
    let a = event.apply(tight_a).unwrap();
    let b = event.apply(tight_b).unwrap();
    let c = event.apply(loose).unwrap();

    assert!(ptr::eq(a, b));
    assert!(!ptr::eq(a, c));
    assert_eq!(a.value().unwrap().len(), 1);
    assert_eq!(c.value().unwrap().len(), 2);

    // Final state, tight electrons, loose electrons.
    assert_eq!(event.stats().computed, 3);
    assert_eq!(event.stats().hits, 2);
}

#[test]
fn identity_follows_dependency_configuration() {
    let mut registry = ProjectionRegistry::new();
    let all = registry.register(FinalState::new()).unwrap();
    let central = registry
        .register(
            FinalState::new()
                .with_cut(Quantity::AbsEta, prism_foundation::Comparison::Less, 2.5)
                .unwrap(),
        )
        .unwrap();
    let from_all = registry.register(Selection::new(all, electrons(2.47)).unwrap()).unwrap();
    let from_central = registry
        .register(Selection::new(central, electrons(2.47)).unwrap())
        .unwrap();
    let graph = registry.seal().unwrap();

    assert!(!graph.equivalent(from_all, from_central).unwrap());
    let order = graph.compare(from_all, from_central).unwrap();
    assert_eq!(graph.compare(from_central, from_all).unwrap(), order.reverse());
}

#[test]
fn selection_constraints_reach_the_graph() {
    let mut registry = ProjectionRegistry::new();
    let fs = registry
        .register(
            FinalState::new()
                .with_cut(Quantity::AbsEta, prism_foundation::Comparison::Less, 4.9)
                .unwrap(),
        )
        .unwrap();
    let sel = registry.register(Selection::new(fs, electrons(2.47)).unwrap()).unwrap();
    let graph = registry.seal().unwrap();

    let cuts = graph.constraints(sel).unwrap().cuts();
    assert_eq!(cuts.range(Quantity::AbsEta).unwrap().high(), 2.47);
    assert_eq!(cuts.range(Quantity::Pt).unwrap().low(), 25.0);
}
