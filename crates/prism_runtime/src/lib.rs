//! Runtime for Prism.
//!
//! This crate provides:
//! - [`Analysis`] - The analysis lifecycle trait
//! - [`AnalysisHandler`] - Runs analyses over events with beam checking
//! - [`RunConfig`] and [`LogConfig`] - Run configuration
//! - [`init_logging`] - `tracing` subscriber setup
//! - [`parallel`] - Concurrent per-event processing

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod analysis;
pub mod config;
pub mod handler;
pub mod logging;
pub mod parallel;

pub use analysis::{Analysis, Outcome, Setup};
pub use config::{LogConfig, RunConfig};
pub use handler::{AnalysisHandler, AnalysisStats, AnalysisSummary, RunSummary};
pub use logging::init_logging;
pub use parallel::project_events;
