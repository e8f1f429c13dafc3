//! Integration tests for the per-event cache

use std::ptr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use prism_engine::projections::{FinalState, MomentumSum};
use prism_engine::{Event, ProjectionRegistry};

use crate::{Multiplicity, lepton_event};

#[test]
fn repeated_application_computes_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = ProjectionRegistry::new();
    let handle = registry.register(Multiplicity::new(20.0, &calls)).unwrap();
    let graph = registry.seal().unwrap();

    let event = Event::new(&graph, lepton_event(1));
    let first = event.apply(handle).unwrap();
    let second = event.apply(handle).unwrap();

    assert!(ptr::eq(first, second));
    assert_eq!(first.value(), Some(&4));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(event.stats().computed, 1);
    assert_eq!(event.stats().hits, 1);
}

#[test]
fn equivalent_registrations_share_one_value() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = ProjectionRegistry::new();
    let handles: Vec<_> = (0..5)
        .map(|i| {
            registry
                .register_as(format!("copy{i}"), Multiplicity::new(20.0, &calls))
                .unwrap()
        })
        .collect();
    let graph = registry.seal().unwrap();
    assert_eq!(graph.identity_count(), 1);

    let event = Event::new(&graph, lepton_event(1));
    let values: Vec<_> = handles.iter().map(|h| event.apply(*h).unwrap()).collect();
    assert!(values.windows(2).all(|w| ptr::eq(w[0], w[1])));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(event.cached_count(), 1);
}

#[test]
fn events_do_not_share_caches() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = ProjectionRegistry::new();
    let handle = registry.register(Multiplicity::new(20.0, &calls)).unwrap();
    let graph = registry.seal().unwrap();

    for number in 0..3 {
        let event = Event::new(&graph, lepton_event(number));
        assert!(!event.is_cached(handle));
        event.apply(handle).unwrap();
        assert!(event.is_cached(handle));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn unapplied_projections_are_never_computed() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = ProjectionRegistry::new();
    let used = registry.register(Multiplicity::new(20.0, &calls)).unwrap();
    let _unused = registry.register(Multiplicity::new(40.0, &calls)).unwrap();
    let graph = registry.seal().unwrap();

    let event = Event::new(&graph, lepton_event(1));
    event.apply(used).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(event.cached_count(), 1);
}

#[test]
fn dependencies_are_cached_for_later_readers() {
    let mut registry = ProjectionRegistry::new();
    let fs = registry.register(FinalState::new()).unwrap();
    let sum = registry.register(MomentumSum::new(fs)).unwrap();
    let graph = registry.seal().unwrap();

    let event = Event::new(&graph, lepton_event(1));
    let summary = event.apply(sum).unwrap().value().unwrap();
    assert_eq!(summary.count, 5);
    assert!(event.is_cached(fs));

    let particles = event.apply(fs).unwrap().value().unwrap();
    assert_eq!(particles.len(), 5);
    assert_eq!(event.stats().computed, 2);
    assert_eq!(event.stats().hits, 1);
}
