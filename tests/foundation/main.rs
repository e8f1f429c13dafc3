//! Integration tests for Layer 0: Foundation
//!
//! Tests for the comparison combinator, particle kinematics, beams, and cuts.

mod kinematics;
