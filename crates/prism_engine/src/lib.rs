//! Projection engine for Prism.
//!
//! This crate provides:
//! - [`Projection`] - The trait every event computation implements
//! - [`ProjectionRegistry`] - Setup-time registration with cycle detection
//! - [`ProjectionGraph`] - The sealed graph with structural identities
//! - [`Event`] - Per-event cache computing each identity at most once
//! - [`Constraints`] - Beam and cut constraint aggregation
//! - [`Filter`] - Comparable particle filters
//! - [`projections`] - Standard projections

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod constraint;
pub mod event;
pub mod filter;
pub mod projection;
pub mod projections;
pub mod registry;

pub use constraint::Constraints;
pub use event::{CacheStats, Event, Resolved};
pub use filter::{Filter, IdFilter, KinematicRange, SpeciesFilter};
pub use projection::{Computed, Dependency, Handle, Projection, ProjectionId, ProjectionKind};
pub use registry::{IdentityId, ProjectionGraph, ProjectionRegistry};
