//! Integration tests for Layer 2: Runtime
//!
//! Tests for the analysis handler and parallel event processing.

mod handler;

use prism_engine::projections::{FinalState, Selection};
use prism_engine::{Computed, Event, Filter, Handle};
use prism_foundation::{
    BeamPairs, Error, EventRecord, FourMomentum, Particle, ParticleStatus, PdgId, Quantity, Result,
};
use prism_runtime::{Analysis, Outcome, Setup};

/// Requires a number of central, hard electrons.
pub struct Electrons {
    pub name: String,
    pub abs_eta_max: f64,
    pub min_count: usize,
    pub beams: BeamPairs,
    pub selection: Option<Handle<Selection>>,
}

impl Electrons {
    pub fn new(name: &str, abs_eta_max: f64, min_count: usize) -> Self {
        Self {
            name: name.to_string(),
            abs_eta_max,
            min_count,
            beams: BeamPairs::any(),
            selection: None,
        }
    }

    pub fn for_beams(mut self, beams: BeamPairs) -> Self {
        self.beams = beams;
        self
    }
}

pub fn electron_filter(abs_eta_max: f64) -> Result<Filter> {
    Ok(Filter::abs_ids([PdgId::ELECTRON])
        .and(Filter::kinematic(Quantity::Pt, 25.0, f64::INFINITY)?)
        .and(Filter::kinematic(Quantity::AbsEta, 0.0, abs_eta_max)?))
}

impl Analysis for Electrons {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_beams(&self) -> BeamPairs {
        self.beams.clone()
    }

    fn init(&mut self, setup: &mut Setup<'_>) -> Result<()> {
        let fs = setup.register(FinalState::new())?;
        let selection = Selection::new(fs, electron_filter(self.abs_eta_max)?)?.with_min_count(self.min_count);
        self.selection = Some(setup.register(selection)?);
        Ok(())
    }

    fn analyze(&mut self, event: &Event<'_>) -> Result<Outcome> {
        let selection = self
            .selection
            .ok_or_else(|| Error::configuration("analysis used before init"))?;
        Ok(match event.apply(selection)? {
            Computed::Value(_) => Outcome::Accepted,
            Computed::Veto(reason) => Outcome::veto(reason.clone()),
        })
    }
}

fn beam(pid: PdgId, energy: f64, forward: bool) -> Particle {
    let pz = if forward { energy } else { -energy };
    Particle::new(pid, FourMomentum::new(energy, 0.0, 0.0, pz)).with_status(ParticleStatus::Beam)
}

/// A proton-proton event with one central electron, one forward positron,
/// one soft electron, and a muon pair.
pub fn pp_event(number: u64) -> EventRecord {
    EventRecord::new(number)
        .with_weight(2.0)
        .with_particle(beam(PdgId::PROTON, 6500.0, true))
        .with_particle(beam(PdgId::PROTON, 6500.0, false))
        .with_particle(Particle::new(PdgId::ELECTRON, FourMomentum::from_pt_eta_phi(45.0, 0.4, 0.0)))
        .with_particle(Particle::new(PdgId::POSITRON, FourMomentum::from_pt_eta_phi(30.0, 2.48, 1.5)))
        .with_particle(Particle::new(PdgId::ELECTRON, FourMomentum::from_pt_eta_phi(12.0, -1.0, 3.0)))
        .with_particle(Particle::new(PdgId::MUON, FourMomentum::from_pt_eta_phi(38.0, 1.1, -1.0)))
        .with_particle(Particle::new(PdgId::ANTIMUON, FourMomentum::from_pt_eta_phi(27.0, -0.3, 2.2)))
}
