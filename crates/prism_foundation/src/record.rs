//! Raw per-event particle records.
//!
//! An [`EventRecord`] is what an event source hands to the engine: the
//! ordered particle list with ancestry links, an event number, and a weight.
//! The engine never mutates a record once an event has been built from it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::particle::{Particle, ParticleStatus, PdgId};

/// One generated collision.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventRecord {
    number: u64,
    weight: f64,
    particles: im::Vector<Particle>,
}

impl EventRecord {
    /// Creates an empty record with unit weight.
    #[must_use]
    pub fn new(number: u64) -> Self {
        Self {
            number,
            weight: 1.0,
            particles: im::Vector::new(),
        }
    }

    /// Sets the event weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Appends a particle, assigning its index. Children links of the
    /// referenced parents are filled in automatically.
    #[must_use]
    pub fn with_particle(mut self, particle: Particle) -> Self {
        self.push(particle);
        self
    }

    /// Appends a particle and returns its index.
    pub fn push(&mut self, mut particle: Particle) -> u32 {
        let index = u32::try_from(self.particles.len()).unwrap_or(u32::MAX);
        particle.index = index;
        for &parent in &particle.parents {
            if let Some(p) = self.particles.get_mut(parent as usize) {
                p.children.push(index);
            }
        }
        self.particles.push_back(particle);
        index
    }

    /// Event number assigned by the source.
    #[must_use]
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Event weight.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Number of particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Returns true if the record holds no particles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particle by index.
    #[must_use]
    pub fn particle(&self, index: u32) -> Option<&Particle> {
        self.particles.get(index as usize)
    }

    /// All particles in record order.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Stable final-state particles.
    pub fn final_state(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_final())
    }

    /// The two incoming beam particles, if the record has exactly two or more.
    #[must_use]
    pub fn beam_particles(&self) -> Option<(&Particle, &Particle)> {
        let mut beams = self
            .particles
            .iter()
            .filter(|p| p.status == ParticleStatus::Beam);
        Some((beams.next()?, beams.next()?))
    }

    /// Species of the two beams.
    #[must_use]
    pub fn beam_ids(&self) -> Option<(PdgId, PdgId)> {
        self.beam_particles().map(|(a, b)| (a.pid, b.pid))
    }

    /// Centre-of-mass energy of the beams.
    #[must_use]
    pub fn sqrt_s(&self) -> Option<f64> {
        self.beam_particles()
            .map(|(a, b)| (a.momentum + b.momentum).mass())
    }

    /// Parents of a particle.
    pub fn parents_of<'a>(&'a self, particle: &'a Particle) -> impl Iterator<Item = &'a Particle> {
        particle.parents.iter().filter_map(|&i| self.particle(i))
    }

    /// Children of a particle.
    pub fn children_of<'a>(
        &'a self,
        particle: &'a Particle,
    ) -> impl Iterator<Item = &'a Particle> {
        particle.children.iter().filter_map(|&i| self.particle(i))
    }
}
