//! Sharing never changes what an analysis sees
//!
//! Every selection is evaluated twice: once in a registry shared with all
//! other selections, once alone. The outputs must agree.

use proptest::prelude::*;

use prism::engine::projections::{FinalState, Selection};
use prism::engine::{Event, Filter, ProjectionRegistry};
use prism::foundation::{EventRecord, FourMomentum, Particle, Particles, PdgId, Quantity};

const SPECIES: [PdgId; 6] = [
    PdgId::ELECTRON,
    PdgId::POSITRON,
    PdgId::MUON,
    PdgId::PHOTON,
    PdgId::PI_PLUS,
    PdgId::NU_E,
];

fn record_strategy() -> impl Strategy<Value = EventRecord> {
    prop::collection::vec((0..SPECIES.len(), 1.0..80.0f64, -4.0..4.0f64, -3.0..3.0f64), 0..20).prop_map(
        |particles| {
            let mut record = EventRecord::new(1);
            for (species, pt, eta, phi) in particles {
                record.push(Particle::new(SPECIES[species], FourMomentum::from_pt_eta_phi(pt, eta, phi)));
            }
            record
        },
    )
}

fn selection_strategy() -> impl Strategy<Value = (usize, f64, f64, usize)> {
    (0..SPECIES.len(), 0.0..50.0f64, 0.5..4.0f64, 0..3usize)
}

fn select(registry: &mut ProjectionRegistry, (species, pt, eta, min): (usize, f64, f64, usize)) -> prism::engine::Handle<Selection> {
    let fs = registry.register(FinalState::new()).unwrap();
    let filter = Filter::abs_ids([SPECIES[species]])
        .and(Filter::kinematic(Quantity::Pt, pt, f64::INFINITY).unwrap())
        .and(Filter::kinematic(Quantity::AbsEta, 0.0, eta).unwrap());
    registry
        .register(Selection::new(fs, filter).unwrap().with_min_count(min))
        .unwrap()
}

fn alone(config: (usize, f64, f64, usize), record: &EventRecord) -> Option<Particles> {
    let mut registry = ProjectionRegistry::new();
    let handle = select(&mut registry, config);
    let graph = registry.seal().unwrap();
    let event = Event::new(&graph, record.clone());
    event.apply(handle).unwrap().value().cloned()
}

proptest! {
    #[test]
    fn shared_outputs_match_isolated_outputs(
        record in record_strategy(),
        configs in prop::collection::vec(selection_strategy(), 1..6),
    ) {
        let mut registry = ProjectionRegistry::new();
        let handles: Vec<_> = configs.iter().map(|c| select(&mut registry, *c)).collect();
        let graph = registry.seal().unwrap();
        let event = Event::new(&graph, record.clone());

        for (handle, config) in handles.iter().zip(&configs) {
            let shared = event.apply(*handle).unwrap().value().cloned();
            prop_assert_eq!(shared, alone(*config, &record));
        }
        prop_assert!(usize::try_from(event.stats().computed).unwrap() <= graph.identity_count());
    }
}
