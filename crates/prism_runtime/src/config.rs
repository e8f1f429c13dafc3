//! Run configuration.

use prism_foundation::PdgId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogConfig {
    /// Default filter directive, used when `RUST_LOG` is not set.
    pub level: String,

    /// Print the module path of each event.
    pub show_target: bool,

    /// Use ANSI colours.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_target: false,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Verbose logging for the engine and runtime.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "info,prism_engine=debug,prism_runtime=debug".to_string(),
            show_target: true,
            ansi: true,
        }
    }

    /// Builder method to set the filter directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Builder method to enable/disable target display.
    #[must_use]
    pub fn with_show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    /// Builder method to enable/disable ANSI colours.
    #[must_use]
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }
}

/// Configuration for one analysis run.
///
/// Passed explicitly to the [`AnalysisHandler`](crate::AnalysisHandler);
/// there is no global run state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunConfig {
    /// Run name used in logs and the summary.
    pub name: String,

    /// Colliding beams. When unset, they are read from the first event
    /// that has beam particles.
    pub beams: Option<(PdgId, PdgId)>,

    /// Keep analyses whose beam requirements do not match the run.
    pub ignore_beams: bool,

    /// Stop after this many events.
    pub max_events: Option<u64>,

    /// Logging.
    pub log: LogConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: "prism".to_string(),
            beams: None,
            ignore_beams: false,
            max_events: None,
            log: LogConfig::default(),
        }
    }
}

impl RunConfig {
    /// Creates a configuration with the given run name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Development preset: verbose logging and a small event limit.
    #[must_use]
    pub fn development() -> Self {
        Self {
            name: "prism-dev".to_string(),
            beams: None,
            ignore_beams: false,
            max_events: Some(1000),
            log: LogConfig::development(),
        }
    }

    /// Builder method to set the run beams.
    #[must_use]
    pub fn with_beams(mut self, a: PdgId, b: PdgId) -> Self {
        self.beams = Some((a, b));
        self
    }

    /// Builder method to keep beam-incompatible analyses.
    #[must_use]
    pub fn with_ignore_beams(mut self, ignore: bool) -> Self {
        self.ignore_beams = ignore;
        self
    }

    /// Builder method to set the event limit.
    #[must_use]
    pub fn with_max_events(mut self, max: u64) -> Self {
        self.max_events = Some(max);
        self
    }

    /// Builder method to set the logging configuration.
    #[must_use]
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}
