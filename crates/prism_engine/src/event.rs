//! Per-event projection cache.
//!
//! An [`Event`] wraps one [`EventRecord`] together with a cache holding one
//! slot per projection identity. Applying a projection computes it at most
//! once per identity per event; every later application by any requester
//! returns a reference to the same stored value.
//!
//! Slots are write-once and never evicted while the event lives, so
//! references handed out by [`Event::apply`] stay valid for the event's
//! lifetime. An event is used from one thread at a time: it is `Send` but
//! not `Sync`.

use std::any::{Any, type_name};
use std::cell::{Cell, OnceCell};

use prism_foundation::{Error, ErrorKind, EventRecord, Particles, Result};
use tracing::{debug, trace};

use crate::projection::{Computed, Dependency, Handle, Projection, ProjectionId};
use crate::registry::ProjectionGraph;

type Slot = OnceCell<Box<dyn Any + Send + Sync>>;

/// Cache counters for one event.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Applications answered from the cache.
    pub hits: u64,
    /// Applications that ran a computation.
    pub computed: u64,
}

impl CacheStats {
    /// Adds another set of counters to this one.
    pub fn merge(&mut self, other: CacheStats) {
        self.hits += other.hits;
        self.computed += other.computed;
    }
}

/// One event plus its projection cache.
#[derive(Debug)]
pub struct Event<'g> {
    graph: &'g ProjectionGraph,
    record: EventRecord,
    slots: Vec<Slot>,
    stats: Cell<CacheStats>,
}

impl<'g> Event<'g> {
    /// Creates an event with an empty cache.
    #[must_use]
    pub fn new(graph: &'g ProjectionGraph, record: EventRecord) -> Self {
        let slots = (0..graph.identity_count()).map(|_| OnceCell::new()).collect();
        Self {
            graph,
            record,
            slots,
            stats: Cell::new(CacheStats::default()),
        }
    }

    /// The raw record.
    #[must_use]
    pub fn record(&self) -> &EventRecord {
        &self.record
    }

    /// The graph this event evaluates against.
    #[must_use]
    pub fn graph(&self) -> &'g ProjectionGraph {
        self.graph
    }

    /// Event number.
    #[must_use]
    pub fn number(&self) -> u64 {
        self.record.number()
    }

    /// Event weight.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.record.weight()
    }

    /// Cache counters so far.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats.get()
    }

    /// Number of identities computed for this event.
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.slots.iter().filter(|s| s.get().is_some()).count()
    }

    /// Returns true if the projection's identity already has a value.
    #[must_use]
    pub fn is_cached(&self, id: impl Into<ProjectionId>) -> bool {
        self.graph
            .identity(id)
            .ok()
            .and_then(|identity| self.slots.get(identity.slot()))
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Applies a projection, computing it on first use.
    ///
    /// # Errors
    /// Returns an error if the handle is not from this event's graph or the
    /// computation fails at engine level. Vetoes are values, not errors.
    pub fn apply<P: Projection>(&self, handle: Handle<P>) -> Result<&Computed<P::Output>> {
        self.output(handle.id())
    }

    /// Applies a projection by id and reads its output as `T`.
    ///
    /// # Errors
    /// Returns `OutputMismatch` if the projection does not produce `T`, or
    /// any error [`apply`](Self::apply) can return.
    pub fn output<T: Send + Sync + 'static>(&self, id: impl Into<ProjectionId>) -> Result<&Computed<T>> {
        let id = id.into();
        self.get_or_compute(id)?
            .downcast_ref::<Computed<T>>()
            .ok_or_else(|| {
                Error::new(ErrorKind::OutputMismatch {
                    projection: self.graph.label(id).unwrap_or("?").to_string(),
                    expected: type_name::<T>(),
                })
            })
    }

    /// Applies a particle-producing projection by id.
    ///
    /// # Errors
    /// Same as [`output`](Self::output).
    pub fn particles(&self, id: impl Into<ProjectionId>) -> Result<&Computed<Particles>> {
        self.output(id)
    }

    fn get_or_compute(&self, id: ProjectionId) -> Result<&(dyn Any + Send + Sync)> {
        let node = self.graph.node(id)?;
        let identity = self.graph.identity(id)?;
        let slot = self
            .slots
            .get(identity.slot())
            .ok_or_else(|| Error::internal(format!("no cache slot for identity {identity}")))?;

        if let Some(value) = slot.get() {
            self.bump(|s| s.hits += 1);
            trace!(projection = %node.label, %identity, event = self.number(), "cache hit");
            return Ok(&**value);
        }

        let resolved = Resolved {
            event: self,
            owner: &node.label,
            dependencies: &node.dependencies,
        };
        let value = node
            .projection
            .erased_compute(&self.record, &resolved)
            .map_err(|e| e.in_frame(node.label.clone()))?;
        self.bump(|s| s.computed += 1);
        debug!(projection = %node.label, %identity, event = self.number(), "computed projection");
        Ok(&**slot.get_or_init(|| value))
    }

    fn bump(&self, f: impl FnOnce(&mut CacheStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

/// Dependency access handed to [`Projection::compute`].
///
/// Only the dependencies the projection declared are reachable; anything
/// else is an `UndeclaredDependency` error.
pub struct Resolved<'a> {
    event: &'a Event<'a>,
    owner: &'a str,
    dependencies: &'a [Dependency],
}

impl<'a> Resolved<'a> {
    /// Output of a declared dependency.
    ///
    /// # Errors
    /// Returns `UndeclaredDependency` if `handle` was not declared, or any
    /// error from computing it.
    pub fn get<P: Projection>(&self, handle: Handle<P>) -> Result<&'a Computed<P::Output>> {
        self.check(handle.id())?;
        self.event.apply(handle)
    }

    /// Output of a declared dependency, by id and output type.
    ///
    /// # Errors
    /// Returns `UndeclaredDependency` if `id` was not declared, or
    /// `OutputMismatch` if it does not produce `T`.
    pub fn output<T: Send + Sync + 'static>(&self, id: impl Into<ProjectionId>) -> Result<&'a Computed<T>> {
        let id = id.into();
        self.check(id)?;
        self.event.output(id)
    }

    /// Output of the dependency declared under `name`.
    ///
    /// # Errors
    /// Returns `UndeclaredDependency` if no dependency has that name.
    pub fn named<T: Send + Sync + 'static>(&self, name: &str) -> Result<&'a Computed<T>> {
        let dep = self
            .dependencies
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| self.undeclared(name.to_string()))?;
        self.event.output(dep.id)
    }

    /// Particles produced by a declared dependency.
    ///
    /// # Errors
    /// Same as [`output`](Self::output).
    pub fn particles(&self, id: impl Into<ProjectionId>) -> Result<&'a Computed<Particles>> {
        self.output(id)
    }

    fn check(&self, id: ProjectionId) -> Result<()> {
        if self.dependencies.iter().any(|d| d.id == id) {
            Ok(())
        } else {
            let label = self.event.graph.label(id).unwrap_or("?");
            Err(self.undeclared(format!("{label} ({id})")))
        }
    }

    fn undeclared(&self, dependency: String) -> Error {
        Error::new(ErrorKind::UndeclaredDependency {
            projection: self.owner.to_string(),
            dependency,
        })
    }
}
