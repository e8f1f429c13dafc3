//! Error types for the Prism system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! Setup-time failures (configuration and dependency cycles) are fatal and
//! surface before any event is processed. A projection that finds the event
//! lacks the structure it needs does not produce an error; it returns a veto
//! value instead.

use std::fmt;

use thiserror::Error;

use crate::cuts::Quantity;

/// The main error type for Prism operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto this error's context, creating the context if needed.
    #[must_use]
    pub fn in_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration(message.into()))
    }

    /// Creates a dependency cycle error from the labels along the cycle.
    #[must_use]
    pub fn dependency_cycle(path: Vec<String>) -> Self {
        Self::new(ErrorKind::DependencyCycle { path })
    }

    /// Creates a contradictory cut error.
    #[must_use]
    pub fn contradictory_cut(quantity: Quantity, low: f64, high: f64) -> Self {
        Self::new(ErrorKind::ContradictoryCut {
            quantity,
            low,
            high,
        })
    }

    /// Creates an error for a projection whose effective beam set is empty.
    #[must_use]
    pub fn no_compatible_beams(projection: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoCompatibleBeams(projection.into()))
    }

    /// Creates an unknown projection error.
    #[must_use]
    pub fn unknown_projection(index: u32) -> Self {
        Self::new(ErrorKind::UnknownProjection(index))
    }

    /// Creates an undefined projection error.
    #[must_use]
    pub fn undefined_projection(label: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedProjection(label.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true for errors that belong to analysis setup rather than
    /// event processing.
    #[must_use]
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Configuration(_)
                | ErrorKind::DependencyCycle { .. }
                | ErrorKind::ContradictoryCut { .. }
                | ErrorKind::NoCompatibleBeams(_)
                | ErrorKind::KindCollision { .. }
                | ErrorKind::UnknownProjection(_)
                | ErrorKind::UndefinedProjection(_)
                | ErrorKind::AlreadyDefined(_)
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Declared configuration is self-contradictory or otherwise invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A projection would depend on itself, directly or transitively.
    #[error("dependency cycle: {}", .path.join(" -> "))]
    DependencyCycle {
        /// Projection labels along the cycle, first and last being the same.
        path: Vec<String>,
    },

    /// Two cuts on the same quantity leave an empty range.
    #[error("contradictory cut on {quantity}: [{low}, {high}] is empty")]
    ContradictoryCut {
        /// The constrained quantity.
        quantity: Quantity,
        /// Combined lower bound.
        low: f64,
        /// Combined upper bound.
        high: f64,
    },

    /// No beam configuration satisfies a projection and all its dependencies.
    #[error("no compatible beam pair for {0}")]
    NoCompatibleBeams(String),

    /// A kind key was registered by two different concrete types.
    #[error("projection kind {kind} is already used by {existing}")]
    KindCollision {
        /// The contested kind key.
        kind: String,
        /// Type name of the first registrant.
        existing: String,
    },

    /// A handle does not refer to any projection in the registry.
    #[error("unknown projection handle #{0}")]
    UnknownProjection(u32),

    /// A projection was declared but never defined.
    #[error("projection {0} was declared but never defined")]
    UndefinedProjection(String),

    /// A projection slot was defined twice.
    #[error("projection {0} is already defined")]
    AlreadyDefined(String),

    /// A projection read a dependency it did not declare.
    #[error("{projection} accessed undeclared dependency {dependency}")]
    UndeclaredDependency {
        /// The projection being computed.
        projection: String,
        /// The dependency it tried to read.
        dependency: String,
    },

    /// A cached output did not have the type the requester expected.
    #[error("output of {projection} is not a {expected}")]
    OutputMismatch {
        /// The projection whose output was read.
        projection: String,
        /// The expected output type name.
        expected: &'static str,
    },

    /// An analysis failed during one of its lifecycle phases.
    #[error("analysis {analysis} failed: {message}")]
    Analysis {
        /// The failing analysis.
        analysis: String,
        /// What went wrong.
        message: String,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Projection or analysis that raised the error.
    pub source: Option<String>,
    /// Event number being processed, if any.
    pub event: Option<u64>,
    /// Chain of projections or analyses leading to the error.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the event number.
    #[must_use]
    pub fn with_event(mut self, number: u64) -> Self {
        self.event = Some(number);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "in {source}")?;
        }
        if let Some(event) = self.event {
            write!(f, " (event {event})")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  via {frame}")?;
            }
        }
        Ok(())
    }
}

/// Result alias used throughout Prism.
pub type Result<T> = std::result::Result<T, Error>;
