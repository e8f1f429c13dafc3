//! Integration tests for Layer 1: Engine
//!
//! Tests for the per-event cache, structural identity, and registration.

mod caching;
mod identity;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use prism_engine::{Computed, Dependency, Projection, ProjectionId, ProjectionKind, Resolved};
use prism_foundation::{CmpResult, EventRecord, FourMomentum, Particle, PdgId, Result, cmp};

/// Counts final-state particles, recording how often it ran.
#[derive(Debug)]
pub struct Multiplicity {
    pub min_pt: f64,
    pub calls: Arc<AtomicUsize>,
}

impl Multiplicity {
    pub fn new(min_pt: f64, calls: &Arc<AtomicUsize>) -> Self {
        Self {
            min_pt,
            calls: Arc::clone(calls),
        }
    }
}

impl Projection for Multiplicity {
    type Output = usize;

    fn kind(&self) -> ProjectionKind {
        ProjectionKind::new("tests.multiplicity")
    }

    fn compare(&self, other: &Self) -> CmpResult {
        cmp(&self.min_pt, &other.min_pt)
    }

    fn compute(&self, record: &EventRecord, _: &Resolved<'_>) -> Result<Computed<usize>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Computed::Value(
            record.final_state().filter(|p| p.pt() > self.min_pt).count(),
        ))
    }
}

/// A projection with arbitrary dependencies, for graph-shape tests.
#[derive(Debug)]
pub struct Link {
    pub deps: Vec<ProjectionId>,
    pub calls: Arc<AtomicUsize>,
}

impl Projection for Link {
    type Output = ();

    fn kind(&self) -> ProjectionKind {
        ProjectionKind::new("tests.link")
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.deps
            .iter()
            .enumerate()
            .map(|(i, id)| Dependency::new(format!("dep{i}"), *id))
            .collect()
    }

    fn compare(&self, _: &Self) -> CmpResult {
        CmpResult::Equal
    }

    fn compute(&self, _: &EventRecord, _: &Resolved<'_>) -> Result<Computed<()>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Computed::Value(()))
    }
}

/// Three electrons and two muons, one electron forward and one soft.
pub fn lepton_event(number: u64) -> EventRecord {
    EventRecord::new(number)
        .with_particle(Particle::new(PdgId::ELECTRON, FourMomentum::from_pt_eta_phi(45.0, 0.4, 0.0)))
        .with_particle(Particle::new(PdgId::POSITRON, FourMomentum::from_pt_eta_phi(30.0, 2.48, 1.5)))
        .with_particle(Particle::new(PdgId::ELECTRON, FourMomentum::from_pt_eta_phi(12.0, -1.0, 3.0)))
        .with_particle(Particle::new(PdgId::MUON, FourMomentum::from_pt_eta_phi(38.0, 1.1, -1.0)))
        .with_particle(Particle::new(PdgId::ANTIMUON, FourMomentum::from_pt_eta_phi(27.0, -0.3, 2.2)))
}
