//! Beam and cut constraints.
//!
//! Each projection declares the beam configurations it is valid for and the
//! kinematic cuts it applies. The effective constraints of a projection are
//! its own intersected with those of everything it depends on; the graph
//! memoizes them per projection when it is sealed.

use std::fmt;

use prism_foundation::{
    BeamPair, BeamPairs, CmpResult, Compare, Comparison, Cuts, PdgId, Quantity, Range, Result, cmp,
};

/// Beam and cut constraints of one projection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Constraints {
    beams: BeamPairs,
    cuts: Cuts,
}

impl Constraints {
    /// No constraints: every beam configuration, no cuts.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Creates constraints from parts.
    #[must_use]
    pub fn new(beams: BeamPairs, cuts: Cuts) -> Self {
        Self { beams, cuts }
    }

    /// Replaces the accepted beam configurations.
    #[must_use]
    pub fn with_beams(mut self, beams: BeamPairs) -> Self {
        self.beams = beams;
        self
    }

    /// Restricts to a single beam configuration.
    #[must_use]
    pub fn with_beam_pair(self, pair: BeamPair) -> Self {
        self.with_beams(BeamPairs::none().with(pair))
    }

    /// Adds a one-sided cut.
    ///
    /// # Errors
    /// Returns an error if the cut contradicts an existing one.
    pub fn with_cut(mut self, quantity: Quantity, comparison: Comparison, value: f64) -> Result<Self> {
        self.cuts = self.cuts.with_cut(quantity, comparison, value)?;
        Ok(self)
    }

    /// Adds a range cut.
    ///
    /// # Errors
    /// Returns an error if the range contradicts an existing cut.
    pub fn with_range(mut self, quantity: Quantity, range: Range) -> Result<Self> {
        self.cuts = self.cuts.with_range(quantity, range)?;
        Ok(self)
    }

    /// Adds every cut in `cuts`.
    ///
    /// # Errors
    /// Returns an error if any cut contradicts an existing one.
    pub fn with_cuts(mut self, cuts: &Cuts) -> Result<Self> {
        self.cuts = self.cuts.combine(cuts)?;
        Ok(self)
    }

    /// Accepted beam configurations.
    #[must_use]
    pub fn beams(&self) -> &BeamPairs {
        &self.beams
    }

    /// Kinematic cuts.
    #[must_use]
    pub fn cuts(&self) -> &Cuts {
        &self.cuts
    }

    /// Returns true if the collision of `a` on `b` is accepted.
    #[must_use]
    pub fn accepts_beams(&self, a: PdgId, b: PdgId) -> bool {
        self.beams.accepts(a, b)
    }

    /// Intersects two sets of constraints.
    ///
    /// An empty beam intersection is returned as is; callers decide whether
    /// that is an error.
    ///
    /// # Errors
    /// Returns a contradictory cut error if the cuts cannot both hold.
    pub fn combine(&self, other: &Constraints) -> Result<Constraints> {
        Ok(Self {
            beams: self.beams.intersect(&other.beams),
            cuts: self.cuts.combine(&other.cuts)?,
        })
    }
}

impl Compare for Constraints {
    fn compare(&self, other: &Self) -> CmpResult {
        cmp(&self.beams, &other.beams).then_with(|| cmp(&self.cuts, &other.cuts))
    }
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "beams {}", self.beams)?;
        if !self.cuts.is_empty() {
            write!(f, "; cuts {}", self.cuts)?;
        }
        Ok(())
    }
}
