//! Prism - Projection caching engine for collider event analysis
//!
//! This crate re-exports all layers of the Prism system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: prism_runtime    - Analysis lifecycle, configuration, logging
//! Layer 1: prism_engine     - Projections, registry, per-event cache
//! Layer 0: prism_foundation - Core types (CmpResult, Particle, Error)
//! ```

pub use prism_engine as engine;
pub use prism_foundation as foundation;
pub use prism_runtime as runtime;
