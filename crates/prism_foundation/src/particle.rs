//! Particles, species identifiers, and four-momenta.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cmp::{CmpResult, Compare};

// =============================================================================
// PdgId
// =============================================================================

/// Particle species identifier using the PDG Monte Carlo numbering scheme.
///
/// Negative values denote antiparticles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PdgId(pub i32);

impl PdgId {
    /// Electron.
    pub const ELECTRON: PdgId = PdgId(11);
    /// Positron.
    pub const POSITRON: PdgId = PdgId(-11);
    /// Electron neutrino.
    pub const NU_E: PdgId = PdgId(12);
    /// Muon.
    pub const MUON: PdgId = PdgId(13);
    /// Antimuon.
    pub const ANTIMUON: PdgId = PdgId(-13);
    /// Muon neutrino.
    pub const NU_MU: PdgId = PdgId(14);
    /// Tau.
    pub const TAU: PdgId = PdgId(15);
    /// Tau neutrino.
    pub const NU_TAU: PdgId = PdgId(16);
    /// Gluon.
    pub const GLUON: PdgId = PdgId(21);
    /// Photon.
    pub const PHOTON: PdgId = PdgId(22);
    /// Z boson.
    pub const Z0: PdgId = PdgId(23);
    /// W+ boson.
    pub const W_PLUS: PdgId = PdgId(24);
    /// Neutral pion.
    pub const PI0: PdgId = PdgId(111);
    /// Positive pion.
    pub const PI_PLUS: PdgId = PdgId(211);
    /// Negative pion.
    pub const PI_MINUS: PdgId = PdgId(-211);
    /// Long-lived neutral kaon.
    pub const K0_L: PdgId = PdgId(130);
    /// Positive kaon.
    pub const K_PLUS: PdgId = PdgId(321);
    /// Neutron.
    pub const NEUTRON: PdgId = PdgId(2112);
    /// Proton.
    pub const PROTON: PdgId = PdgId(2212);
    /// Antiproton.
    pub const ANTIPROTON: PdgId = PdgId(-2212);

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns the identifier with the antiparticle sign dropped.
    #[must_use]
    pub const fn abs(self) -> PdgId {
        PdgId(self.0.abs())
    }

    /// Returns true for charged and neutral leptons.
    #[must_use]
    pub const fn is_lepton(self) -> bool {
        matches!(self.0.abs(), 11..=18)
    }

    /// Returns true for neutrinos.
    #[must_use]
    pub const fn is_neutrino(self) -> bool {
        matches!(self.0.abs(), 12 | 14 | 16 | 18)
    }

    /// Returns true for mesons and baryons.
    #[must_use]
    pub const fn is_hadron(self) -> bool {
        let a = self.0.abs();
        a > 100 && a < 1_000_000 && (a / 10) % 10 != 0
    }

    /// Three times the electric charge, in units of the positron charge.
    ///
    /// Covers leptons, quarks, gauge bosons, and standard hadrons. Hadrons are
    /// resolved from their quark content.
    #[must_use]
    pub fn three_charge(self) -> i32 {
        let sign = self.0.signum();
        let a = self.0.abs();
        let charge = match a {
            1 | 3 | 5 => -1,
            2 | 4 | 6 => 2,
            11 | 13 | 15 | 17 => -3,
            12 | 14 | 16 | 18 | 21 | 22 | 23 | 25 => 0,
            24 => 3,
            _ if self.is_hadron() => return hadron_three_charge(a) * sign,
            _ => 0,
        };
        charge * sign
    }

    /// Returns true when the particle carries electric charge.
    #[must_use]
    pub fn is_charged(self) -> bool {
        self.three_charge() != 0
    }
}

fn quark_three_charge(q: i32) -> i32 {
    if q % 2 == 0 { 2 } else { -1 }
}

fn hadron_three_charge(abs_id: i32) -> i32 {
    let q1 = (abs_id / 1000) % 10;
    let q2 = (abs_id / 100) % 10;
    let q3 = (abs_id / 10) % 10;
    if q1 == 0 {
        // Meson: quark q2 and antiquark q3. The heavier quark sets the sign.
        let c = quark_three_charge(q2) - quark_three_charge(q3);
        if q2 % 2 == 0 { c } else { -c }
    } else {
        quark_three_charge(q1) + quark_three_charge(q2) + quark_three_charge(q3)
    }
}

impl Compare for PdgId {
    fn compare(&self, other: &Self) -> CmpResult {
        self.0.cmp(&other.0).into()
    }
}

impl fmt::Display for PdgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            11 => "e-",
            -11 => "e+",
            13 => "mu-",
            -13 => "mu+",
            15 => "tau-",
            -15 => "tau+",
            22 => "gamma",
            2212 => "p+",
            -2212 => "pbar-",
            _ => return write!(f, "{}", self.0),
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// FourMomentum
// =============================================================================

/// Energy-momentum four-vector, in GeV.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FourMomentum {
    /// Energy.
    pub e: f64,
    /// Momentum along x.
    pub px: f64,
    /// Momentum along y.
    pub py: f64,
    /// Momentum along z (beam axis).
    pub pz: f64,
}

impl FourMomentum {
    /// Creates a four-momentum from energy and momentum components.
    #[must_use]
    pub const fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self { e, px, py, pz }
    }

    /// Creates a massless four-momentum from transverse momentum,
    /// pseudorapidity, and azimuth.
    #[must_use]
    pub fn from_pt_eta_phi(pt: f64, eta: f64, phi: f64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let e = pt * eta.cosh();
        Self { e, px, py, pz }
    }

    /// Transverse momentum.
    #[must_use]
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Magnitude of the three-momentum.
    #[must_use]
    pub fn p(&self) -> f64 {
        (self.px * self.px + self.py * self.py + self.pz * self.pz).sqrt()
    }

    /// Pseudorapidity. Infinite for momenta along the beam axis.
    #[must_use]
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 {
            return if self.pz >= 0.0 {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            };
        }
        (self.pz / pt).asinh()
    }

    /// Absolute pseudorapidity.
    #[must_use]
    pub fn abs_eta(&self) -> f64 {
        self.eta().abs()
    }

    /// Rapidity along the beam axis.
    #[must_use]
    pub fn rapidity(&self) -> f64 {
        0.5 * ((self.e + self.pz) / (self.e - self.pz)).ln()
    }

    /// Azimuthal angle in `(-pi, pi]`.
    #[must_use]
    pub fn phi(&self) -> f64 {
        self.py.atan2(self.px)
    }

    /// Invariant mass squared.
    #[must_use]
    pub fn mass2(&self) -> f64 {
        self.e * self.e - self.px * self.px - self.py * self.py - self.pz * self.pz
    }

    /// Invariant mass; negative mass-squared from rounding is clamped to zero.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass2().max(0.0).sqrt()
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: FourMomentum) -> FourMomentum {
        FourMomentum {
            e: self.e + rhs.e,
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
        }
    }
}

impl AddAssign for FourMomentum {
    fn add_assign(&mut self, rhs: FourMomentum) {
        *self = *self + rhs;
    }
}

impl Sum for FourMomentum {
    fn sum<I: Iterator<Item = FourMomentum>>(iter: I) -> Self {
        iter.fold(FourMomentum::default(), Add::add)
    }
}

impl<'a> Sum<&'a FourMomentum> for FourMomentum {
    fn sum<I: Iterator<Item = &'a FourMomentum>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Particle
// =============================================================================

/// Generator status of a particle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParticleStatus {
    /// Stable final-state particle.
    Final,
    /// Particle that decayed into others.
    Decayed,
    /// Incoming beam particle.
    Beam,
    /// Any other generator-specific status code.
    Other(i32),
}

impl ParticleStatus {
    /// Maps a HepMC-style numeric status code.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Final,
            2 => Self::Decayed,
            4 => Self::Beam,
            other => Self::Other(other),
        }
    }

    /// Returns the numeric status code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Final => 1,
            Self::Decayed => 2,
            Self::Beam => 4,
            Self::Other(code) => code,
        }
    }
}

/// One entry of an event record.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Particle {
    /// Position in the owning record.
    pub index: u32,
    /// Species.
    pub pid: PdgId,
    /// Four-momentum.
    pub momentum: FourMomentum,
    /// Generator status.
    pub status: ParticleStatus,
    /// Indices of parent particles.
    pub parents: Vec<u32>,
    /// Indices of child particles.
    pub children: Vec<u32>,
}

impl Particle {
    /// Creates a final-state particle without ancestry links.
    #[must_use]
    pub fn new(pid: PdgId, momentum: FourMomentum) -> Self {
        Self {
            index: 0,
            pid,
            momentum,
            status: ParticleStatus::Final,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: ParticleStatus) -> Self {
        self.status = status;
        self
    }

    /// Adds a parent link.
    #[must_use]
    pub fn with_parent(mut self, parent: u32) -> Self {
        self.parents.push(parent);
        self
    }

    /// Transverse momentum.
    #[must_use]
    pub fn pt(&self) -> f64 {
        self.momentum.pt()
    }

    /// Pseudorapidity.
    #[must_use]
    pub fn eta(&self) -> f64 {
        self.momentum.eta()
    }

    /// Absolute pseudorapidity.
    #[must_use]
    pub fn abs_eta(&self) -> f64 {
        self.momentum.abs_eta()
    }

    /// Returns true for stable final-state particles.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.status == ParticleStatus::Final
    }
}

/// An ordered collection of particles, as produced by particle projections.
pub type Particles = Vec<Particle>;
