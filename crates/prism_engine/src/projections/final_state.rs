use prism_foundation::{
    BeamPairs, CmpResult, Comparison, Cuts, Error, EventRecord, Particles, Quantity, Result, cmp,
};

use crate::constraint::Constraints;
use crate::event::Resolved;
use crate::projection::{Computed, Projection, ProjectionKind};

/// Stable final-state particles passing kinematic cuts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FinalState {
    cuts: Cuts,
}

impl FinalState {
    /// Kind key.
    pub const KIND: ProjectionKind = ProjectionKind::new("prism.final-state");

    /// Every final-state particle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a one-sided cut such as `|eta| < 4.9`.
    ///
    /// # Errors
    /// Returns an error if the cut contradicts an existing one or is not
    /// defined per particle.
    pub fn with_cut(mut self, quantity: Quantity, comparison: Comparison, value: f64) -> Result<Self> {
        if quantity == Quantity::SqrtS {
            return Err(Error::configuration(format!(
                "{quantity} cannot be cut on per particle"
            )));
        }
        self.cuts = self.cuts.with_cut(quantity, comparison, value)?;
        Ok(self)
    }

    /// The applied cuts.
    #[must_use]
    pub fn cuts(&self) -> &Cuts {
        &self.cuts
    }
}

impl Projection for FinalState {
    type Output = Particles;

    fn kind(&self) -> ProjectionKind {
        Self::KIND
    }

    fn name(&self) -> &str {
        "FinalState"
    }

    fn compare(&self, other: &Self) -> CmpResult {
        cmp(&self.cuts, &other.cuts)
    }

    fn constraints(&self) -> Constraints {
        Constraints::new(BeamPairs::any(), self.cuts.clone())
    }

    fn compute(&self, record: &EventRecord, _: &Resolved<'_>) -> Result<Computed<Particles>> {
        let kept = record
            .final_state()
            .filter(|p| {
                self.cuts.iter().all(|(quantity, range)| {
                    quantity.of(&p.momentum).is_some_and(|v| range.contains(v))
                })
            })
            .cloned()
            .collect();
        Ok(Computed::Value(kept))
    }
}
