//! Beam particles and compatible beam configurations.
//!
//! Every projection declares which colliding beam pairs it makes sense for.
//! The `Any` wildcard matches every species; a [`BeamPairs`] set is the union
//! of the configurations it accepts, and intersecting two sets keeps exactly
//! the configurations both accept.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cmp::{CmpResult, Compare, cmp_iter};
use crate::particle::PdgId;

/// One side of a collision.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BeamParticle {
    /// Wildcard matching every species.
    Any,
    /// A specific species.
    Species(PdgId),
}

impl BeamParticle {
    /// Proton beam.
    pub const PROTON: BeamParticle = BeamParticle::Species(PdgId::PROTON);
    /// Antiproton beam.
    pub const ANTIPROTON: BeamParticle = BeamParticle::Species(PdgId::ANTIPROTON);
    /// Electron beam.
    pub const ELECTRON: BeamParticle = BeamParticle::Species(PdgId::ELECTRON);
    /// Positron beam.
    pub const POSITRON: BeamParticle = BeamParticle::Species(PdgId::POSITRON);

    /// Returns true if this side accepts the given species.
    #[must_use]
    pub fn matches(self, pid: PdgId) -> bool {
        match self {
            Self::Any => true,
            Self::Species(own) => own == pid,
        }
    }

    /// The most general side accepted by both, if any.
    #[must_use]
    pub fn unify(self, other: BeamParticle) -> Option<BeamParticle> {
        match (self, other) {
            (Self::Any, x) | (x, Self::Any) => Some(x),
            (a, b) if a == b => Some(a),
            _ => None,
        }
    }
}

impl From<PdgId> for BeamParticle {
    fn from(pid: PdgId) -> Self {
        Self::Species(pid)
    }
}

impl fmt::Display for BeamParticle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Species(pid) => write!(f, "{pid}"),
        }
    }
}

/// An unordered pair of colliding beams.
///
/// The two sides are stored sorted so `(p, pbar)` and `(pbar, p)` are the
/// same pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BeamPair {
    first: BeamParticle,
    second: BeamParticle,
}

impl BeamPair {
    /// Creates a beam pair.
    #[must_use]
    pub fn new(a: impl Into<BeamParticle>, b: impl Into<BeamParticle>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    /// The pair accepting every collision.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            first: BeamParticle::Any,
            second: BeamParticle::Any,
        }
    }

    /// The two sides, sorted.
    #[must_use]
    pub const fn sides(&self) -> (BeamParticle, BeamParticle) {
        (self.first, self.second)
    }

    /// Returns true if the collision of `a` on `b` (in either order) is accepted.
    #[must_use]
    pub fn accepts(&self, a: PdgId, b: PdgId) -> bool {
        (self.first.matches(a) && self.second.matches(b))
            || (self.first.matches(b) && self.second.matches(a))
    }

    /// Pairs accepted by both `self` and `other`, trying both orientations.
    fn unify(&self, other: &BeamPair) -> impl Iterator<Item = BeamPair> {
        let straight = self
            .first
            .unify(other.first)
            .zip(self.second.unify(other.second));
        let crossed = self
            .first
            .unify(other.second)
            .zip(self.second.unify(other.first));
        straight
            .into_iter()
            .chain(crossed)
            .map(|(a, b)| BeamPair::new(a, b))
    }
}

impl Compare for BeamPair {
    fn compare(&self, other: &Self) -> CmpResult {
        self.cmp(other).into()
    }
}

impl fmt::Display for BeamPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// A set of accepted beam configurations.
///
/// Backed by a persistent ordered set so cloning during constraint
/// aggregation is cheap.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BeamPairs(im::OrdSet<BeamPair>);

impl BeamPairs {
    /// Accepts every collision.
    #[must_use]
    pub fn any() -> Self {
        Self(im::OrdSet::unit(BeamPair::any()))
    }

    /// Accepts nothing.
    #[must_use]
    pub fn none() -> Self {
        Self(im::OrdSet::new())
    }

    /// Accepts exactly one configuration.
    #[must_use]
    pub fn single(a: impl Into<BeamParticle>, b: impl Into<BeamParticle>) -> Self {
        Self(im::OrdSet::unit(BeamPair::new(a, b)))
    }

    /// Returns a set that additionally accepts `pair`.
    #[must_use]
    pub fn with(&self, pair: BeamPair) -> Self {
        Self(self.0.update(pair))
    }

    /// Configurations accepted by both sets.
    #[must_use]
    pub fn intersect(&self, other: &BeamPairs) -> BeamPairs {
        let mut result = im::OrdSet::new();
        for a in &self.0 {
            for b in &other.0 {
                for pair in a.unify(b) {
                    result.insert(pair);
                }
            }
        }
        Self(result)
    }

    /// Returns true if the collision of `a` on `b` is accepted.
    #[must_use]
    pub fn accepts(&self, a: PdgId, b: PdgId) -> bool {
        self.0.iter().any(|pair| pair.accepts(a, b))
    }

    /// Returns true if no configuration is accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the set accepts every collision.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.0.contains(&BeamPair::any())
    }

    /// Number of listed configurations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the listed configurations in order.
    pub fn iter(&self) -> impl Iterator<Item = &BeamPair> {
        self.0.iter()
    }
}

impl Default for BeamPairs {
    fn default() -> Self {
        Self::any()
    }
}

impl FromIterator<BeamPair> for BeamPairs {
    fn from_iter<I: IntoIterator<Item = BeamPair>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Compare for BeamPairs {
    fn compare(&self, other: &Self) -> CmpResult {
        cmp_iter(self.0.iter(), other.0.iter())
    }
}

impl fmt::Display for BeamPairs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, pair) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{pair}")?;
        }
        write!(f, "}}")
    }
}
