use prism_foundation::{BeamPairs, CmpResult, EventRecord, Particles, Result, cmp};

use crate::constraint::Constraints;
use crate::event::Resolved;
use crate::filter::Filter;
use crate::projection::{Computed, Dependency, Handle, Projection, ProjectionId, ProjectionKind};

/// Particles from a source projection that pass a filter.
///
/// Vetoes the event when fewer than `min_count` particles pass, or when the
/// source itself vetoed.
#[derive(Clone, Debug)]
pub struct Selection {
    source: ProjectionId,
    filter: Filter,
    min_count: usize,
}

impl Selection {
    /// Kind key.
    pub const KIND: ProjectionKind = ProjectionKind::new("prism.selection");

    /// Selects particles from `source` passing `filter`.
    ///
    /// # Errors
    /// Returns a configuration error if the filter can never accept anything.
    pub fn new<S>(source: Handle<S>, filter: Filter) -> Result<Self>
    where
        S: Projection<Output = Particles>,
    {
        filter.validate()?;
        Ok(Self {
            source: source.id(),
            filter,
            min_count: 0,
        })
    }

    /// Requires at least `n` particles to pass.
    #[must_use]
    pub fn with_min_count(mut self, n: usize) -> Self {
        self.min_count = n;
        self
    }

    /// The applied filter.
    #[must_use]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Minimum number of particles required.
    #[must_use]
    pub fn min_count(&self) -> usize {
        self.min_count
    }
}

impl Projection for Selection {
    type Output = Particles;

    fn kind(&self) -> ProjectionKind {
        Self::KIND
    }

    fn name(&self) -> &str {
        "Selection"
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::new("source", self.source)]
    }

    fn compare(&self, other: &Self) -> CmpResult {
        cmp(&self.filter, &other.filter).then_with(|| cmp(&self.min_count, &other.min_count))
    }

    fn constraints(&self) -> Constraints {
        // Validated in the constructor.
        self.filter
            .cuts()
            .map_or_else(|_| Constraints::any(), |cuts| Constraints::new(BeamPairs::any(), cuts))
    }

    fn compute(&self, _: &EventRecord, deps: &Resolved<'_>) -> Result<Computed<Particles>> {
        let source = match deps.particles(self.source)? {
            Computed::Value(particles) => particles,
            Computed::Veto(reason) => return Ok(Computed::veto(format!("source vetoed: {reason}"))),
        };
        let kept: Particles = source
            .iter()
            .filter(|p| self.filter.accepts(p))
            .cloned()
            .collect();
        if kept.len() < self.min_count {
            return Ok(Computed::veto(format!(
                "{} particles passed {}, {} required",
                kept.len(),
                self.filter,
                self.min_count
            )));
        }
        Ok(Computed::Value(kept))
    }
}
