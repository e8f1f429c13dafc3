//! Tri-state comparison combinator.
//!
//! Projections define a total order over their configuration so that two
//! structurally identical projections can be recognised as the same cache key.
//! The building block is [`CmpResult`], produced by [`cmp`] for any pair of
//! [`Compare`] values and chained with [`CmpResult::then_with`] so that the
//! first non-equal field decides:
//!
//! ```
//! use prism_foundation::cmp::{cmp, CmpResult};
//!
//! let a = (25.0_f64, "electron");
//! let b = (25.0_f64, "muon");
//! let result = cmp(&a.0, &b.0).then_with(|| cmp(a.1, b.1));
//! assert_eq!(result, CmpResult::Less);
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// CmpResult
// =============================================================================

/// Outcome of comparing two values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CmpResult {
    /// The left value orders before the right value.
    Less,
    /// The two values are equivalent.
    Equal,
    /// The left value orders after the right value.
    Greater,
}

impl CmpResult {
    /// Returns `self` unless it is `Equal`, in which case returns `next`.
    #[must_use]
    pub const fn then(self, next: CmpResult) -> Self {
        match self {
            Self::Equal => next,
            decided => decided,
        }
    }

    /// Lazy form of [`CmpResult::then`]: `next` only runs when `self` is `Equal`.
    #[must_use]
    pub fn then_with(self, next: impl FnOnce() -> CmpResult) -> Self {
        match self {
            Self::Equal => next(),
            decided => decided,
        }
    }

    /// Swaps `Less` and `Greater`.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Less => Self::Greater,
            Self::Equal => Self::Equal,
            Self::Greater => Self::Less,
        }
    }

    /// Returns true for `Equal`.
    #[must_use]
    pub const fn is_eq(self) -> bool {
        matches!(self, Self::Equal)
    }

    /// Returns true for `Less`.
    #[must_use]
    pub const fn is_lt(self) -> bool {
        matches!(self, Self::Less)
    }

    /// Returns true for `Greater`.
    #[must_use]
    pub const fn is_gt(self) -> bool {
        matches!(self, Self::Greater)
    }

    /// Returns -1, 0 or 1.
    #[must_use]
    pub const fn signum(self) -> i8 {
        match self {
            Self::Less => -1,
            Self::Equal => 0,
            Self::Greater => 1,
        }
    }
}

impl From<Ordering> for CmpResult {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Self::Less,
            Ordering::Equal => Self::Equal,
            Ordering::Greater => Self::Greater,
        }
    }
}

impl From<CmpResult> for Ordering {
    fn from(result: CmpResult) -> Self {
        match result {
            CmpResult::Less => Ordering::Less,
            CmpResult::Equal => Ordering::Equal,
            CmpResult::Greater => Ordering::Greater,
        }
    }
}

impl fmt::Display for CmpResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Less => write!(f, "less"),
            Self::Equal => write!(f, "equal"),
            Self::Greater => write!(f, "greater"),
        }
    }
}

// =============================================================================
// Compare
// =============================================================================

/// Total ordering over configuration values.
///
/// Implementations must be antisymmetric (`a.compare(b)` is the reverse of
/// `b.compare(a)`) and transitive. Floats use the IEEE 754 total order, so
/// `NaN` compares equal to itself and `-0.0` orders before `0.0`.
pub trait Compare {
    /// Compares `self` against `other`.
    fn compare(&self, other: &Self) -> CmpResult;
}

/// Compares two values.
#[must_use]
pub fn cmp<T: Compare + ?Sized>(a: &T, b: &T) -> CmpResult {
    a.compare(b)
}

/// Lexicographic comparison of two sequences: element-wise, then by length.
pub fn cmp_iter<'a, T, I>(a: I, b: I) -> CmpResult
where
    T: Compare + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut a = a.into_iter();
    let mut b = b.into_iter();
    loop {
        match (a.next(), b.next()) {
            (None, None) => return CmpResult::Equal,
            (None, Some(_)) => return CmpResult::Less,
            (Some(_), None) => return CmpResult::Greater,
            (Some(x), Some(y)) => {
                let result = x.compare(y);
                if !result.is_eq() {
                    return result;
                }
            }
        }
    }
}

macro_rules! compare_via_ord {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Compare for $ty {
                fn compare(&self, other: &Self) -> CmpResult {
                    Ord::cmp(self, other).into()
                }
            }
        )*
    };
}

compare_via_ord!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, str, String
);

impl Compare for f64 {
    fn compare(&self, other: &Self) -> CmpResult {
        self.total_cmp(other).into()
    }
}

impl Compare for f32 {
    fn compare(&self, other: &Self) -> CmpResult {
        self.total_cmp(other).into()
    }
}

impl<T: Compare + ?Sized> Compare for &T {
    fn compare(&self, other: &Self) -> CmpResult {
        (**self).compare(*other)
    }
}

impl<T: Compare + ?Sized> Compare for Box<T> {
    fn compare(&self, other: &Self) -> CmpResult {
        (**self).compare(&**other)
    }
}

impl<T: Compare> Compare for Option<T> {
    fn compare(&self, other: &Self) -> CmpResult {
        match (self, other) {
            (None, None) => CmpResult::Equal,
            (None, Some(_)) => CmpResult::Less,
            (Some(_), None) => CmpResult::Greater,
            (Some(a), Some(b)) => a.compare(b),
        }
    }
}

impl<T: Compare> Compare for [T] {
    fn compare(&self, other: &Self) -> CmpResult {
        cmp_iter(self, other)
    }
}

impl<T: Compare> Compare for Vec<T> {
    fn compare(&self, other: &Self) -> CmpResult {
        cmp_iter(self, other)
    }
}

impl<T: Compare> Compare for BTreeSet<T> {
    fn compare(&self, other: &Self) -> CmpResult {
        cmp_iter(self, other)
    }
}

impl<K: Compare, V: Compare> Compare for BTreeMap<K, V> {
    fn compare(&self, other: &Self) -> CmpResult {
        let mut a = self.iter();
        let mut b = other.iter();
        loop {
            match (a.next(), b.next()) {
                (None, None) => return CmpResult::Equal,
                (None, Some(_)) => return CmpResult::Less,
                (Some(_), None) => return CmpResult::Greater,
                (Some((ka, va)), Some((kb, vb))) => {
                    let result = ka.compare(kb).then_with(|| va.compare(vb));
                    if !result.is_eq() {
                        return result;
                    }
                }
            }
        }
    }
}

impl<A: Compare, B: Compare> Compare for (A, B) {
    fn compare(&self, other: &Self) -> CmpResult {
        self.0
            .compare(&other.0)
            .then_with(|| self.1.compare(&other.1))
    }
}

impl<A: Compare, B: Compare, C: Compare> Compare for (A, B, C) {
    fn compare(&self, other: &Self) -> CmpResult {
        self.0
            .compare(&other.0)
            .then_with(|| self.1.compare(&other.1))
            .then_with(|| self.2.compare(&other.2))
    }
}
