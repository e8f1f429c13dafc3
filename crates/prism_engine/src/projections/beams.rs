use prism_foundation::{CmpResult, EventRecord, Particle, Result};

use crate::event::Resolved;
use crate::projection::{Computed, Projection, ProjectionKind};

/// The two incoming beam particles and their centre-of-mass energy.
#[derive(Clone, Debug, PartialEq)]
pub struct BeamParticles {
    /// First beam in record order.
    pub first: Particle,
    /// Second beam in record order.
    pub second: Particle,
    /// Centre-of-mass energy.
    pub sqrt_s: f64,
}

/// Extracts the beam particles from the record.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Beams;

impl Beams {
    /// Kind key.
    pub const KIND: ProjectionKind = ProjectionKind::new("prism.beams");
}

impl Projection for Beams {
    type Output = BeamParticles;

    fn kind(&self) -> ProjectionKind {
        Self::KIND
    }

    fn name(&self) -> &str {
        "Beams"
    }

    fn compare(&self, _: &Self) -> CmpResult {
        CmpResult::Equal
    }

    fn compute(&self, record: &EventRecord, _: &Resolved<'_>) -> Result<Computed<BeamParticles>> {
        let Some((first, second)) = record.beam_particles() else {
            return Ok(Computed::veto("record has fewer than two beam particles"));
        };
        Ok(Computed::Value(BeamParticles {
            first: first.clone(),
            second: second.clone(),
            sqrt_s: (first.momentum + second.momentum).mass(),
        }))
    }
}
