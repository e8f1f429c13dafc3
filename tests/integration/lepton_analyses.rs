//! Two lepton analyses sharing a run

use std::sync::{Arc, Mutex};

use prism::engine::projections::{FinalState, MomentumSum, Selection};
use prism::engine::{Computed, Event, Filter, Handle, SpeciesFilter};
use prism::foundation::{
    Error, EventRecord, FourMomentum, Particle, ParticleStatus, PdgId, Quantity, Result,
};
use prism::runtime::{Analysis, AnalysisHandler, Outcome, RunConfig, Setup};

fn electrons(abs_eta_max: f64) -> Result<Filter> {
    Ok(Filter::abs_ids([PdgId::ELECTRON])
        .and(Filter::kinematic(Quantity::Pt, 25.0, f64::INFINITY)?)
        .and(Filter::kinematic(Quantity::AbsEta, 0.0, abs_eta_max)?))
}

/// Reconstructs Z bosons from electron pairs.
struct ZToElectrons {
    electrons: Option<Handle<Selection>>,
    masses: Arc<Mutex<Vec<f64>>>,
}

impl Analysis for ZToElectrons {
    fn name(&self) -> &str {
        "Z_EE"
    }

    fn init(&mut self, setup: &mut Setup<'_>) -> Result<()> {
        let fs = setup.register(FinalState::new())?;
        self.electrons = Some(setup.register(Selection::new(fs, electrons(2.47)?)?.with_min_count(2))?);
        Ok(())
    }

    fn analyze(&mut self, event: &Event<'_>) -> Result<Outcome> {
        let handle = self.electrons.ok_or_else(|| Error::configuration("Z_EE not initialised"))?;
        let electrons = match event.apply(handle)? {
            Computed::Value(electrons) => electrons,
            Computed::Veto(reason) => return Ok(Outcome::veto(reason.clone())),
        };
        let pair: FourMomentum = electrons.iter().take(2).map(|p| &p.momentum).sum();
        if let Ok(mut masses) = self.masses.lock() {
            masses.push(pair.mass());
        }
        Ok(Outcome::Accepted)
    }
}

/// Measures missing transverse momentum of visible particles.
struct MissingMomentum {
    sum: Option<Handle<MomentumSum>>,
    values: Arc<Mutex<Vec<f64>>>,
}

impl Analysis for MissingMomentum {
    fn name(&self) -> &str {
        "MET"
    }

    fn init(&mut self, setup: &mut Setup<'_>) -> Result<()> {
        let fs = setup.register(FinalState::new())?;
        let visible = setup.register(Selection::new(fs, Filter::from(SpeciesFilter::Visible))?)?;
        self.sum = Some(setup.register(MomentumSum::new(visible))?);
        Ok(())
    }

    fn analyze(&mut self, event: &Event<'_>) -> Result<Outcome> {
        let handle = self.sum.ok_or_else(|| Error::configuration("MET not initialised"))?;
        let Some(summary) = event.apply(handle)?.value() else {
            return Ok(Outcome::veto("no visible particles"));
        };
        if summary.missing_pt() < 10.0 {
            return Ok(Outcome::veto("missing pT below 10"));
        }
        if let Ok(mut values) = self.values.lock() {
            values.push(summary.missing_pt());
        }
        Ok(Outcome::Accepted)
    }
}

fn beams() -> [Particle; 2] {
    [
        Particle::new(PdgId::ELECTRON, FourMomentum::new(45.6, 0.0, 0.0, 45.6)).with_status(ParticleStatus::Beam),
        Particle::new(PdgId::POSITRON, FourMomentum::new(45.6, 0.0, 0.0, -45.6)).with_status(ParticleStatus::Beam),
    ]
}

/// A back-to-back electron pair, a photon, and a neutrino recoiling against it.
fn z_event(number: u64) -> EventRecord {
    let [a, b] = beams();
    EventRecord::new(number)
        .with_particle(a)
        .with_particle(b)
        .with_particle(Particle::new(PdgId::ELECTRON, FourMomentum::from_pt_eta_phi(45.0, 0.0, 0.0)))
        .with_particle(Particle::new(
            PdgId::POSITRON,
            FourMomentum::from_pt_eta_phi(45.0, 0.0, std::f64::consts::PI),
        ))
        .with_particle(Particle::new(PdgId::PHOTON, FourMomentum::from_pt_eta_phi(20.0, 1.0, 0.5)))
        .with_particle(Particle::new(
            PdgId::NU_E,
            FourMomentum::from_pt_eta_phi(20.0, -1.0, 0.5 - std::f64::consts::PI),
        ))
}

/// Only a photon pair, balanced in the transverse plane.
fn diphoton_event(number: u64) -> EventRecord {
    let [a, b] = beams();
    EventRecord::new(number)
        .with_particle(a)
        .with_particle(b)
        .with_particle(Particle::new(PdgId::PHOTON, FourMomentum::from_pt_eta_phi(40.0, 0.2, 1.0)))
        .with_particle(Particle::new(
            PdgId::PHOTON,
            FourMomentum::from_pt_eta_phi(40.0, -0.2, 1.0 - std::f64::consts::PI),
        ))
}

#[test]
fn analyses_run_side_by_side() {
    let masses = Arc::new(Mutex::new(Vec::new()));
    let missing = Arc::new(Mutex::new(Vec::new()));

    let config = RunConfig::new("lep").with_beams(PdgId::ELECTRON, PdgId::POSITRON);
    let mut handler = AnalysisHandler::new(config);
    handler
        .add_analysis(ZToElectrons {
            electrons: None,
            masses: Arc::clone(&masses),
        })
        .unwrap()
        .add_analysis(MissingMomentum {
            sum: None,
            values: Arc::clone(&missing),
        })
        .unwrap();

    let records = vec![z_event(1), diphoton_event(2), z_event(3)];
    let summary = handler.run(records).unwrap();

    assert_eq!(summary.events, 3);
    let z = &summary.analyses[0].stats;
    let met = &summary.analyses[1].stats;
    assert_eq!((z.accepted, z.vetoed), (2, 1));
    assert_eq!((met.accepted, met.vetoed), (2, 1));

    let masses = masses.lock().unwrap();
    assert_eq!(masses.len(), 2);
    assert!(masses.iter().all(|m| (m - 90.0).abs() < 1e-9));

    let missing = missing.lock().unwrap();
    assert!(missing.iter().all(|m| (m - 20.0).abs() < 1e-9));

    // One shared final state, two selections, one sum.
    assert_eq!(handler.graph().unwrap().identity_count(), 4);
}
