//! Integration tests for particles and event records

use prism_foundation::{EventRecord, FourMomentum, Particle, ParticleStatus, PdgId};

#[test]
fn pseudorapidity_round_trips() {
    for eta in [-3.0, -0.5, 0.0, 1.2, 4.0] {
        let p = FourMomentum::from_pt_eta_phi(20.0, eta, 0.3);
        assert!((p.eta() - eta).abs() < 1e-9, "eta {eta}");
        assert!((p.pt() - 20.0).abs() < 1e-9);
    }
}

#[test]
fn species_helpers() {
    assert!(PdgId::ELECTRON.is_lepton());
    assert!(PdgId::ELECTRON.is_charged());
    assert!(PdgId::NU_MU.is_neutrino());
    assert!(!PdgId::NU_MU.is_charged());
    assert!(PdgId::PROTON.is_hadron());
    assert!(PdgId::PI_PLUS.is_charged());
    assert!(!PdgId::PI0.is_charged());
    assert_eq!(PdgId::POSITRON.abs(), PdgId::ELECTRON);
}

#[test]
fn z_decay_record() {
    let record = EventRecord::new(42)
        .with_weight(0.5)
        .with_particle(
            Particle::new(PdgId::ELECTRON, FourMomentum::new(45.6, 0.0, 0.0, 45.6))
                .with_status(ParticleStatus::Beam),
        )
        .with_particle(
            Particle::new(PdgId::POSITRON, FourMomentum::new(45.6, 0.0, 0.0, -45.6))
                .with_status(ParticleStatus::Beam),
        )
        .with_particle(
            Particle::new(PdgId::Z0, FourMomentum::new(91.2, 0.0, 0.0, 0.0))
                .with_status(ParticleStatus::Decayed)
                .with_parent(0)
                .with_parent(1),
        )
        .with_particle(Particle::new(PdgId::MUON, FourMomentum::new(45.6, 45.6, 0.0, 0.0)).with_parent(2))
        .with_particle(
            Particle::new(PdgId::ANTIMUON, FourMomentum::new(45.6, -45.6, 0.0, 0.0)).with_parent(2),
        );

    assert_eq!(record.number(), 42);
    assert!((record.weight() - 0.5).abs() < f64::EPSILON);
    assert_eq!(record.final_state().count(), 2);
    assert!((record.sqrt_s().unwrap() - 91.2).abs() < 1e-9);

    let z = record.particle(2).unwrap();
    assert_eq!(z.children, vec![3, 4]);
    let visible: FourMomentum = record.final_state().map(|p| &p.momentum).sum();
    assert!((visible.mass() - 91.2).abs() < 1e-9);
}
