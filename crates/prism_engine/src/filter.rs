//! Particle filters.
//!
//! A [`Filter`] is a closed, comparable description of which particles to
//! keep. Filters are plain data so that two selections built from equal
//! filters compare equal and share one cached computation.

use std::collections::BTreeSet;
use std::fmt;

use prism_foundation::{
    CmpResult, Compare, Comparison, Cuts, Error, Particle, PdgId, Quantity, Range, Result, cmp,
};

// =============================================================================
// Leaf Filters
// =============================================================================

/// Keeps particles of the listed species.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdFilter {
    ids: BTreeSet<PdgId>,
    either_sign: bool,
}

impl IdFilter {
    /// Matches exactly the listed codes.
    #[must_use]
    pub fn exact(ids: impl IntoIterator<Item = PdgId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            either_sign: false,
        }
    }

    /// Matches the listed codes and their antiparticles.
    #[must_use]
    pub fn either_sign(ids: impl IntoIterator<Item = PdgId>) -> Self {
        Self {
            ids: ids.into_iter().map(PdgId::abs).collect(),
            either_sign: true,
        }
    }

    /// Returns true if the particle's species is listed.
    #[must_use]
    pub fn accepts(&self, particle: &Particle) -> bool {
        let pid = if self.either_sign {
            particle.pid.abs()
        } else {
            particle.pid
        };
        self.ids.contains(&pid)
    }
}

impl Compare for IdFilter {
    fn compare(&self, other: &Self) -> CmpResult {
        cmp(&self.either_sign, &other.either_sign).then_with(|| cmp(&self.ids, &other.ids))
    }
}

/// Keeps particles whose kinematic quantity lies in a range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KinematicRange {
    quantity: Quantity,
    range: Range,
}

impl KinematicRange {
    /// Creates a filter for the closed range `[low, high]`.
    ///
    /// # Errors
    /// Returns a configuration error if the range is empty or the quantity
    /// is not defined per particle.
    pub fn new(quantity: Quantity, low: f64, high: f64) -> Result<Self> {
        Self::with_range(quantity, Range::new(low, high)?)
    }

    /// Creates a filter for an arbitrary range.
    ///
    /// # Errors
    /// Returns a configuration error if the quantity is not defined per
    /// particle.
    pub fn with_range(quantity: Quantity, range: Range) -> Result<Self> {
        if quantity == Quantity::SqrtS {
            return Err(Error::configuration(format!(
                "{quantity} cannot be cut on per particle"
            )));
        }
        Ok(Self { quantity, range })
    }

    /// `pT > value`.
    ///
    /// # Errors
    /// Returns a configuration error if `value` is NaN.
    pub fn pt_above(value: f64) -> Result<Self> {
        Self::with_range(Quantity::Pt, Range::above(value)?)
    }

    /// `|eta| < value`.
    ///
    /// # Errors
    /// Returns a configuration error if `value` is NaN.
    pub fn abs_eta_below(value: f64) -> Result<Self> {
        Self::with_range(Quantity::AbsEta, Range::below(value)?)
    }

    /// The cut quantity.
    #[must_use]
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// The accepted range.
    #[must_use]
    pub fn range(&self) -> Range {
        self.range
    }

    /// Returns true if the particle's quantity is in range.
    #[must_use]
    pub fn accepts(&self, particle: &Particle) -> bool {
        self.quantity
            .of(&particle.momentum)
            .is_some_and(|v| self.range.contains(v))
    }
}

impl Compare for KinematicRange {
    fn compare(&self, other: &Self) -> CmpResult {
        cmp(&self.quantity, &other.quantity).then_with(|| cmp(&self.range, &other.range))
    }
}

/// Keeps particles of a broad species class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpeciesFilter {
    /// Nonzero electric charge.
    Charged,
    /// Zero electric charge.
    Neutral,
    /// Electrons, muons, and taus.
    ChargedLepton,
    /// Neutrinos.
    Neutrino,
    /// Mesons and baryons.
    Hadron,
    /// Everything a detector could see, i.e. not a neutrino.
    Visible,
}

impl SpeciesFilter {
    /// Returns true if the particle belongs to this class.
    #[must_use]
    pub fn accepts(self, particle: &Particle) -> bool {
        let pid = particle.pid;
        match self {
            Self::Charged => pid.is_charged(),
            Self::Neutral => !pid.is_charged(),
            Self::ChargedLepton => pid.is_lepton() && !pid.is_neutrino(),
            Self::Neutrino => pid.is_neutrino(),
            Self::Hadron => pid.is_hadron(),
            Self::Visible => !pid.is_neutrino(),
        }
    }
}

impl Compare for SpeciesFilter {
    fn compare(&self, other: &Self) -> CmpResult {
        self.cmp(other).into()
    }
}

// =============================================================================
// Composite Filter
// =============================================================================

/// A composable particle filter.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Species list.
    Id(IdFilter),
    /// Kinematic range.
    Kinematic(KinematicRange),
    /// Species class.
    Species(SpeciesFilter),
    /// Rejects what the inner filter accepts.
    Veto(Box<Filter>),
    /// Accepts what every inner filter accepts. Empty accepts everything.
    All(Vec<Filter>),
    /// Accepts what at least one inner filter accepts.
    Any(Vec<Filter>),
}

impl Filter {
    /// Accepts every particle.
    #[must_use]
    pub fn everything() -> Self {
        Self::All(Vec::new())
    }

    /// Species filter matching the codes and their antiparticles.
    #[must_use]
    pub fn abs_ids(ids: impl IntoIterator<Item = PdgId>) -> Self {
        Self::Id(IdFilter::either_sign(ids))
    }

    /// Kinematic filter.
    ///
    /// # Errors
    /// See [`KinematicRange::new`].
    pub fn kinematic(quantity: Quantity, low: f64, high: f64) -> Result<Self> {
        Ok(Self::Kinematic(KinematicRange::new(quantity, low, high)?))
    }

    /// One-sided kinematic filter such as `pT > 25`.
    ///
    /// # Errors
    /// See [`Range::from_comparison`] and [`KinematicRange::with_range`].
    pub fn cut(quantity: Quantity, comparison: Comparison, value: f64) -> Result<Self> {
        Ok(Self::Kinematic(KinematicRange::with_range(
            quantity,
            Range::from_comparison(comparison, value)?,
        )?))
    }

    /// Wraps `self` so it rejects what it used to accept.
    #[must_use]
    pub fn vetoed(self) -> Self {
        Self::Veto(Box::new(self))
    }

    /// Conjunction of `self` and `other`, flattening nested conjunctions.
    #[must_use]
    pub fn and(self, other: Filter) -> Self {
        let mut parts = match self {
            Self::All(parts) => parts,
            single => vec![single],
        };
        match other {
            Self::All(more) => parts.extend(more),
            single => parts.push(single),
        }
        Self::All(parts)
    }

    /// Returns true if the particle passes.
    #[must_use]
    pub fn accepts(&self, particle: &Particle) -> bool {
        match self {
            Self::Id(f) => f.accepts(particle),
            Self::Kinematic(f) => f.accepts(particle),
            Self::Species(f) => f.accepts(particle),
            Self::Veto(inner) => !inner.accepts(particle),
            Self::All(parts) => parts.iter().all(|f| f.accepts(particle)),
            Self::Any(parts) => parts.iter().any(|f| f.accepts(particle)),
        }
    }

    /// Rejects filters that could never accept anything.
    ///
    /// # Errors
    /// Returns a configuration error for an empty disjunction, an empty
    /// species list, or conjoined kinematic ranges that do not overlap.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Id(f) if f.ids.is_empty() => {
                Err(Error::configuration("species filter lists no species"))
            }
            Self::Any(parts) if parts.is_empty() => {
                Err(Error::configuration("disjunction of no filters accepts nothing"))
            }
            Self::Veto(inner) => inner.validate(),
            Self::All(parts) | Self::Any(parts) => {
                parts.iter().try_for_each(Filter::validate)?;
                self.cuts().map(|_| ())
            }
            _ => Ok(()),
        }
    }

    /// Kinematic cuts implied for every accepted particle.
    ///
    /// Only top-level ranges and conjunctions of them are expressible as
    /// cuts; other compositions contribute nothing.
    ///
    /// # Errors
    /// Returns a contradictory cut error if conjoined ranges do not overlap.
    pub fn cuts(&self) -> Result<Cuts> {
        match self {
            Self::Kinematic(f) => Cuts::none().with_range(f.quantity, f.range),
            Self::All(parts) => parts
                .iter()
                .try_fold(Cuts::none(), |acc, f| acc.combine(&f.cuts()?)),
            _ => Ok(Cuts::none()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Id(_) => 0,
            Self::Kinematic(_) => 1,
            Self::Species(_) => 2,
            Self::Veto(_) => 3,
            Self::All(_) => 4,
            Self::Any(_) => 5,
        }
    }
}

impl From<IdFilter> for Filter {
    fn from(f: IdFilter) -> Self {
        Self::Id(f)
    }
}

impl From<KinematicRange> for Filter {
    fn from(f: KinematicRange) -> Self {
        Self::Kinematic(f)
    }
}

impl From<SpeciesFilter> for Filter {
    fn from(f: SpeciesFilter) -> Self {
        Self::Species(f)
    }
}

impl Compare for Filter {
    fn compare(&self, other: &Self) -> CmpResult {
        cmp(&self.rank(), &other.rank()).then_with(|| match (self, other) {
            (Self::Id(a), Self::Id(b)) => cmp(a, b),
            (Self::Kinematic(a), Self::Kinematic(b)) => cmp(a, b),
            (Self::Species(a), Self::Species(b)) => cmp(a, b),
            (Self::Veto(a), Self::Veto(b)) => cmp(a, b),
            (Self::All(a), Self::All(b)) | (Self::Any(a), Self::Any(b)) => cmp(a, b),
            _ => CmpResult::Equal,
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(ids) => {
                let sign = if ids.either_sign { "|id|" } else { "id" };
                let list: Vec<String> = ids.ids.iter().map(|p| p.value().to_string()).collect();
                write!(f, "{sign} in [{}]", list.join(", "))
            }
            Self::Kinematic(k) => write!(f, "{} in {}", k.quantity, k.range),
            Self::Species(s) => write!(f, "{s:?}"),
            Self::Veto(inner) => write!(f, "not {inner}"),
            Self::All(parts) if parts.is_empty() => write!(f, "all"),
            Self::All(parts) => write_joined(f, parts, "and"),
            Self::Any(parts) => write_joined(f, parts, "or"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Filter], op: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, " {op} ")?;
        }
        write!(f, "{part}")?;
    }
    write!(f, ")")
}
