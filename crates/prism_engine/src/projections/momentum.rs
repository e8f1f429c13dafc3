use prism_foundation::{CmpResult, EventRecord, FourMomentum, Particles, Result};

use crate::event::Resolved;
use crate::projection::{Computed, Dependency, Handle, Projection, ProjectionId, ProjectionKind};

/// Vector and scalar momentum sums of a particle collection.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MomentumSummary {
    /// Vector sum of four-momenta.
    pub vector: FourMomentum,
    /// Scalar sum of transverse momenta.
    pub scalar_pt: f64,
    /// Number of particles summed.
    pub count: usize,
}

impl MomentumSummary {
    /// Missing transverse momentum, the magnitude of the negated vector sum.
    #[must_use]
    pub fn missing_pt(&self) -> f64 {
        self.vector.pt()
    }
}

/// Sums the momenta of a particle-producing projection.
#[derive(Copy, Clone, Debug)]
pub struct MomentumSum {
    source: ProjectionId,
}

impl MomentumSum {
    /// Kind key.
    pub const KIND: ProjectionKind = ProjectionKind::new("prism.momentum-sum");

    /// Sums particles produced by `source`.
    #[must_use]
    pub fn new<S>(source: Handle<S>) -> Self
    where
        S: Projection<Output = Particles>,
    {
        Self {
            source: source.id(),
        }
    }
}

impl Projection for MomentumSum {
    type Output = MomentumSummary;

    fn kind(&self) -> ProjectionKind {
        Self::KIND
    }

    fn name(&self) -> &str {
        "MomentumSum"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::new("source", self.source)]
    }

    fn compare(&self, _: &Self) -> CmpResult {
        CmpResult::Equal
    }

    fn compute(&self, _: &EventRecord, deps: &Resolved<'_>) -> Result<Computed<MomentumSummary>> {
        let particles = match deps.particles(self.source)? {
            Computed::Value(particles) => particles,
            Computed::Veto(reason) => return Ok(Computed::veto(format!("source vetoed: {reason}"))),
        };
        Ok(Computed::Value(MomentumSummary {
            vector: particles.iter().map(|p| &p.momentum).sum(),
            scalar_pt: particles.iter().map(|p| p.momentum.pt()).sum(),
            count: particles.len(),
        }))
    }
}
