//! Core types for Prism.
//!
//! This crate provides:
//! - [`CmpResult`] and [`Compare`] - The tri-state comparison combinator
//! - [`Particle`], [`PdgId`], [`FourMomentum`] - Particle data
//! - [`EventRecord`] - The raw per-event particle record
//! - [`BeamPairs`] - Compatible beam configurations
//! - [`Cuts`] - Kinematic cut ranges
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod beam;
pub mod cmp;
pub mod cuts;
pub mod error;
pub mod particle;
pub mod record;

pub use beam::{BeamPair, BeamPairs, BeamParticle};
pub use cmp::{CmpResult, Compare, cmp, cmp_iter};
pub use cuts::{Comparison, Cuts, Quantity, Range};
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use particle::{FourMomentum, Particle, ParticleStatus, Particles, PdgId};
pub use record::EventRecord;
