//! The analysis lifecycle.
//!
//! An analysis declares its projections once in [`Analysis::init`], applies
//! them to every event in [`Analysis::analyze`], and wraps up in
//! [`Analysis::finalize`]. Vetoing an event only affects the analysis that
//! vetoed it; the cached projection values are shared and stay valid.

use prism_engine::{Event, Handle, Projection, ProjectionId, ProjectionRegistry};
use prism_foundation::{BeamPairs, Result};

/// What an analysis decided about one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The event was used.
    Accepted,
    /// The event was rejected, with a reason.
    Vetoed(String),
}

impl Outcome {
    /// Creates a veto.
    #[must_use]
    pub fn veto(reason: impl Into<String>) -> Self {
        Self::Vetoed(reason.into())
    }

    /// Returns true for accepted events.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Registration scope handed to [`Analysis::init`].
///
/// Records which projections the analysis declares so the handler can check
/// the beams they accept against the run.
pub struct Setup<'r> {
    registry: &'r mut ProjectionRegistry,
    analysis: &'r str,
    declared: Vec<ProjectionId>,
}

impl<'r> Setup<'r> {
    pub(crate) fn new(registry: &'r mut ProjectionRegistry, analysis: &'r str) -> Self {
        Self {
            registry,
            analysis,
            declared: Vec::new(),
        }
    }

    /// Name of the analysis being set up.
    #[must_use]
    pub fn analysis(&self) -> &str {
        self.analysis
    }

    /// Registers a projection for this analysis.
    ///
    /// # Errors
    /// Any registration error, tagged with the analysis name.
    pub fn register<P: Projection>(&mut self, projection: P) -> Result<Handle<P>> {
        let handle = self
            .registry
            .register(projection)
            .map_err(|e| e.in_frame(self.analysis))?;
        self.declared.push(handle.id());
        Ok(handle)
    }

    /// Registers a projection under an explicit label.
    ///
    /// # Errors
    /// Any registration error, tagged with the analysis name.
    pub fn register_as<P: Projection>(
        &mut self,
        label: impl Into<String>,
        projection: P,
    ) -> Result<Handle<P>> {
        let handle = self
            .registry
            .register_as(label, projection)
            .map_err(|e| e.in_frame(self.analysis))?;
        self.declared.push(handle.id());
        Ok(handle)
    }

    /// Reserves a projection slot to be defined later.
    ///
    /// # Errors
    /// Returns an internal error if the registry has no ids left.
    pub fn declare<P: Projection>(&mut self, label: impl Into<String>) -> Result<Handle<P>> {
        let handle = self
            .registry
            .declare(label)
            .map_err(|e| e.in_frame(self.analysis))?;
        self.declared.push(handle.id());
        Ok(handle)
    }

    /// Defines a slot reserved with [`declare`](Self::declare).
    ///
    /// # Errors
    /// Any definition error, tagged with the analysis name.
    pub fn define<P: Projection>(&mut self, handle: Handle<P>, projection: P) -> Result<Handle<P>> {
        self.registry
            .define(handle, projection)
            .map_err(|e| e.in_frame(self.analysis))
    }

    pub(crate) fn into_declared(self) -> Vec<ProjectionId> {
        self.declared
    }
}

/// A physics analysis.
pub trait Analysis {
    /// Unique analysis name.
    fn name(&self) -> &str;

    /// Beam configurations the analysis is valid for, beyond what its
    /// projections require.
    fn required_beams(&self) -> BeamPairs {
        BeamPairs::any()
    }

    /// Declares projections.
    ///
    /// # Errors
    /// Registration errors abort the run.
    fn init(&mut self, setup: &mut Setup<'_>) -> Result<()>;

    /// Processes one event.
    ///
    /// # Errors
    /// Engine errors abort the run. Rejecting the event is an
    /// [`Outcome::Vetoed`], not an error.
    fn analyze(&mut self, event: &Event<'_>) -> Result<Outcome>;

    /// Called once after the last event.
    ///
    /// # Errors
    /// Errors are reported in the run result.
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}
