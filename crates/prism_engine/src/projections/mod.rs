//! Standard projections.
//!
//! These cover the common building blocks analyses share: the final state
//! within kinematic cuts, filtered particle selections, the incoming beams,
//! and momentum sums.

mod beams;
mod final_state;
mod momentum;
mod selection;

pub use beams::{BeamParticles, Beams};
pub use final_state::FinalState;
pub use momentum::{MomentumSum, MomentumSummary};
pub use selection::Selection;
