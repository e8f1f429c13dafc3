//! Kinematic cuts.
//!
//! A cut restricts one [`Quantity`] to a [`Range`] whose ends are each
//! strict or inclusive. Cuts from a projection and all of its dependencies
//! are combined by intersecting the ranges per quantity; an empty
//! intersection is a configuration error.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cmp::{CmpResult, Compare, cmp};
use crate::error::{Error, Result};

/// A kinematic quantity that can be cut on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Quantity {
    /// Transverse momentum.
    Pt,
    /// Signed pseudorapidity.
    Eta,
    /// Absolute pseudorapidity.
    AbsEta,
    /// Rapidity.
    Rapidity,
    /// Energy.
    Energy,
    /// Invariant mass.
    Mass,
    /// Centre-of-mass energy of the collision.
    SqrtS,
}

impl Quantity {
    /// Evaluates this quantity for a particle momentum.
    ///
    /// Returns `None` for collision-level quantities.
    #[must_use]
    pub fn of(self, momentum: &crate::particle::FourMomentum) -> Option<f64> {
        match self {
            Self::Pt => Some(momentum.pt()),
            Self::Eta => Some(momentum.eta()),
            Self::AbsEta => Some(momentum.abs_eta()),
            Self::Rapidity => Some(momentum.rapidity()),
            Self::Energy => Some(momentum.e),
            Self::Mass => Some(momentum.mass()),
            Self::SqrtS => None,
        }
    }
}

impl Compare for Quantity {
    fn compare(&self, other: &Self) -> CmpResult {
        self.cmp(other).into()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pt => "pT",
            Self::Eta => "eta",
            Self::AbsEta => "|eta|",
            Self::Rapidity => "y",
            Self::Energy => "E",
            Self::Mass => "m",
            Self::SqrtS => "sqrt(s)",
        };
        write!(f, "{name}")
    }
}

/// Comparison operator used to declare a one-sided cut.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Comparison {
    /// Quantity below the value.
    Less,
    /// Quantity at most the value.
    LessEq,
    /// Quantity above the value.
    Greater,
    /// Quantity at least the value.
    GreaterEq,
    /// Quantity equal to the value.
    Equal,
}

/// Interval between two bounds, each of which may be inclusive or strict.
///
/// Either end may be infinite. `pT > 25` and `pT >= 25` are different
/// ranges and never compare equal.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Range {
    low: f64,
    high: f64,
    low_inclusive: bool,
    high_inclusive: bool,
}

impl Range {
    /// The unbounded range.
    pub const ALL: Range = Range {
        low: f64::NEG_INFINITY,
        high: f64::INFINITY,
        low_inclusive: true,
        high_inclusive: true,
    };

    /// Creates the closed range `[low, high]`.
    ///
    /// # Errors
    /// Returns a configuration error if the range is empty or a bound is NaN.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        Self::with_bounds(low, true, high, true)
    }

    /// Creates a range with explicit inclusivity at each end.
    ///
    /// # Errors
    /// Returns a configuration error if the range is empty or a bound is NaN.
    pub fn with_bounds(low: f64, low_inclusive: bool, high: f64, high_inclusive: bool) -> Result<Self> {
        let range = Self {
            low,
            high,
            low_inclusive,
            high_inclusive,
        };
        if low.is_nan() || high.is_nan() {
            return Err(Error::configuration(format!("range bound is NaN: {range}")));
        }
        if range.is_empty() {
            return Err(Error::configuration(format!("empty range: {range}")));
        }
        Ok(range)
    }

    /// Range `[low, +inf]`.
    ///
    /// # Errors
    /// Returns a configuration error if `low` is NaN.
    pub fn at_least(low: f64) -> Result<Self> {
        Self::with_bounds(low, true, f64::INFINITY, true)
    }

    /// Range `(low, +inf]`.
    ///
    /// # Errors
    /// Returns a configuration error if `low` is NaN or `+inf`.
    pub fn above(low: f64) -> Result<Self> {
        Self::with_bounds(low, false, f64::INFINITY, true)
    }

    /// Range `[-inf, high]`.
    ///
    /// # Errors
    /// Returns a configuration error if `high` is NaN.
    pub fn at_most(high: f64) -> Result<Self> {
        Self::with_bounds(f64::NEG_INFINITY, true, high, true)
    }

    /// Range `[-inf, high)`.
    ///
    /// # Errors
    /// Returns a configuration error if `high` is NaN or `-inf`.
    pub fn below(high: f64) -> Result<Self> {
        Self::with_bounds(f64::NEG_INFINITY, true, high, false)
    }

    /// The range accepted by a one-sided cut such as `> value`.
    ///
    /// # Errors
    /// Returns a configuration error if `value` is NaN or the cut accepts
    /// nothing.
    pub fn from_comparison(comparison: Comparison, value: f64) -> Result<Self> {
        match comparison {
            Comparison::Less => Self::below(value),
            Comparison::LessEq => Self::at_most(value),
            Comparison::Greater => Self::above(value),
            Comparison::GreaterEq => Self::at_least(value),
            Comparison::Equal => Self::new(value, value),
        }
    }

    /// Lower bound.
    #[must_use]
    pub const fn low(&self) -> f64 {
        self.low
    }

    /// Upper bound.
    #[must_use]
    pub const fn high(&self) -> f64 {
        self.high
    }

    /// Returns true if the lower bound itself is accepted.
    #[must_use]
    pub const fn low_inclusive(&self) -> bool {
        self.low_inclusive
    }

    /// Returns true if the upper bound itself is accepted.
    #[must_use]
    pub const fn high_inclusive(&self) -> bool {
        self.high_inclusive
    }

    /// Returns true if `value` lies inside the range.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        let above_low = value > self.low || (self.low_inclusive && value == self.low);
        let below_high = value < self.high || (self.high_inclusive && value == self.high);
        above_low && below_high
    }

    /// Returns true for the unbounded range.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.low == f64::NEG_INFINITY && self.high == f64::INFINITY
    }

    /// Intersection of the two ranges, or `None` if it is empty.
    ///
    /// On equal bounds the stricter end wins.
    #[must_use]
    pub fn intersect(&self, other: &Range) -> Option<Range> {
        let (low, low_inclusive) = if self.low > other.low {
            (self.low, self.low_inclusive)
        } else if other.low > self.low {
            (other.low, other.low_inclusive)
        } else {
            (self.low, self.low_inclusive && other.low_inclusive)
        };
        let (high, high_inclusive) = if self.high < other.high {
            (self.high, self.high_inclusive)
        } else if other.high < self.high {
            (other.high, other.high_inclusive)
        } else {
            (self.high, self.high_inclusive && other.high_inclusive)
        };
        let range = Range {
            low,
            high,
            low_inclusive,
            high_inclusive,
        };
        (!range.is_empty()).then_some(range)
    }

    fn is_empty(&self) -> bool {
        self.low > self.high || (self.low == self.high && !(self.low_inclusive && self.high_inclusive))
    }
}

impl Compare for Range {
    fn compare(&self, other: &Self) -> CmpResult {
        cmp(&self.low, &other.low)
            .then_with(|| cmp(&self.low_inclusive, &other.low_inclusive))
            .then_with(|| cmp(&self.high, &other.high))
            .then_with(|| cmp(&self.high_inclusive, &other.high_inclusive))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.low_inclusive { '[' } else { '(' };
        let close = if self.high_inclusive { ']' } else { ')' };
        write!(f, "{open}{}, {}{close}", self.low, self.high)
    }
}

/// A set of per-quantity cuts.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cuts(im::OrdMap<Quantity, Range>);

impl Cuts {
    /// No cuts.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns cuts with `quantity` additionally restricted to `range`.
    ///
    /// # Errors
    /// Returns a contradictory cut error if the combined range is empty.
    pub fn with_range(&self, quantity: Quantity, range: Range) -> Result<Self> {
        let combined = match self.0.get(&quantity) {
            Some(existing) => existing.intersect(&range).ok_or_else(|| {
                Error::contradictory_cut(
                    quantity,
                    existing.low.max(range.low),
                    existing.high.min(range.high),
                )
            })?,
            None => range,
        };
        Ok(Self(self.0.update(quantity, combined)))
    }

    /// Returns cuts with an added one-sided cut such as `pT > 25`.
    ///
    /// # Errors
    /// Returns an error if the value is NaN or the combined range is empty.
    pub fn with_cut(&self, quantity: Quantity, comparison: Comparison, value: f64) -> Result<Self> {
        self.with_range(quantity, Range::from_comparison(comparison, value)?)
    }

    /// Intersects two sets of cuts.
    ///
    /// # Errors
    /// Returns a contradictory cut error if any quantity's range becomes empty.
    pub fn combine(&self, other: &Cuts) -> Result<Self> {
        other
            .0
            .iter()
            .try_fold(self.clone(), |acc, (quantity, range)| {
                acc.with_range(*quantity, *range)
            })
    }

    /// The range for `quantity`, if cut.
    #[must_use]
    pub fn range(&self, quantity: Quantity) -> Option<Range> {
        self.0.get(&quantity).copied()
    }

    /// Returns true if there are no cuts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of cut quantities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates cuts in quantity order.
    pub fn iter(&self) -> impl Iterator<Item = (Quantity, Range)> + '_ {
        self.0.iter().map(|(q, r)| (*q, *r))
    }
}

impl Compare for Cuts {
    fn compare(&self, other: &Self) -> CmpResult {
        let a: Vec<(Quantity, Range)> = self.iter().collect();
        let b: Vec<(Quantity, Range)> = other.iter().collect();
        cmp(&a, &b)
    }
}

impl fmt::Display for Cuts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (quantity, range)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{quantity} in {range}")?;
        }
        Ok(())
    }
}
