//! The projection abstraction.
//!
//! A projection is a named, configured computation over one event. Concrete
//! projections implement [`Projection`]; the engine only ever sees them
//! through a type-erased view so heterogeneous projections can live in one
//! registry arena and be compared structurally.

use std::any::{Any, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use prism_foundation::{CmpResult, Compare, EventRecord, Result, cmp};

use crate::constraint::Constraints;
use crate::event::Resolved;

// =============================================================================
// Identifiers
// =============================================================================

/// Stable discriminant naming a projection kind.
///
/// Kinds are ordered by their key, which makes the cross-kind ordering
/// independent of registration order and of the Rust type layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectionKind(&'static str);

impl ProjectionKind {
    /// Creates a kind from its key.
    #[must_use]
    pub const fn new(key: &'static str) -> Self {
        Self(key)
    }

    /// The kind key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        self.0
    }
}

impl Compare for ProjectionKind {
    fn compare(&self, other: &Self) -> CmpResult {
        cmp(self.0, other.0)
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a projection in a registry arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectionId(pub(crate) u32);

impl ProjectionId {
    /// Raw arena index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    pub(crate) const fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ProjectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Typed handle to a registered projection.
///
/// The type parameter ties the handle to the projection's output type so
/// [`Event::apply`](crate::Event::apply) can hand back a typed reference.
pub struct Handle<P> {
    id: ProjectionId,
    _marker: PhantomData<fn() -> P>,
}

impl<P> Handle<P> {
    pub(crate) const fn new(id: ProjectionId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// The untyped arena id.
    #[must_use]
    pub const fn id(self) -> ProjectionId {
        self.id
    }
}

impl<P> Clone for Handle<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Handle<P> {}

impl<P> PartialEq for Handle<P> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<P> Eq for Handle<P> {}

impl<P> Hash for Handle<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<P> fmt::Debug for Handle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", type_name::<P>(), self.id)
    }
}

impl<P> From<Handle<P>> for ProjectionId {
    fn from(handle: Handle<P>) -> Self {
        handle.id
    }
}

/// A named edge from a projection to one of its dependencies.
///
/// The name is part of the projection's identity: two otherwise equal
/// projections that use the same dependency under different names differ.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dependency {
    /// Name the dependency is used under.
    pub name: String,
    /// The dependency.
    pub id: ProjectionId,
}

impl Dependency {
    /// Creates a named dependency edge.
    #[must_use]
    pub fn new(name: impl Into<String>, id: impl Into<ProjectionId>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Computed Values
// =============================================================================

/// Result of applying a projection to one event.
#[derive(Clone, Debug, PartialEq)]
pub enum Computed<T> {
    /// The projection's output.
    Value(T),
    /// The event lacks the structure this projection needs.
    Veto(String),
}

impl<T> Computed<T> {
    /// Creates a veto with the given reason.
    #[must_use]
    pub fn veto(reason: impl Into<String>) -> Self {
        Self::Veto(reason.into())
    }

    /// The output, unless vetoed.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Veto(_) => None,
        }
    }

    /// Returns true if the projection vetoed the event.
    #[must_use]
    pub fn is_veto(&self) -> bool {
        matches!(self, Self::Veto(_))
    }

    /// The veto reason, if vetoed.
    #[must_use]
    pub fn veto_reason(&self) -> Option<&str> {
        match self {
            Self::Value(_) => None,
            Self::Veto(reason) => Some(reason),
        }
    }

    /// Maps the output, keeping vetoes.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Computed<U> {
        match self {
            Self::Value(v) => Computed::Value(f(v)),
            Self::Veto(reason) => Computed::Veto(reason),
        }
    }
}

// =============================================================================
// Projection Trait
// =============================================================================

/// A configured, named computation over one event.
///
/// Implementations compare only their own configuration fields in
/// [`compare`](Projection::compare). The kind discriminant and the
/// structural comparison of dependencies are handled by the engine.
pub trait Projection: fmt::Debug + Send + Sync + 'static {
    /// What the projection produces.
    type Output: Send + Sync + 'static;

    /// Stable kind discriminant, unique per concrete type.
    fn kind(&self) -> ProjectionKind;

    /// Human-readable name used as the default registration label.
    fn name(&self) -> &str {
        self.kind().key()
    }

    /// Named dependencies, in a fixed order.
    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }

    /// Compares own configuration with another instance of the same type.
    fn compare(&self, other: &Self) -> CmpResult;

    /// Beam and cut constraints this projection declares for itself.
    fn constraints(&self) -> Constraints {
        Constraints::any()
    }

    /// Computes the output for one event.
    ///
    /// Dependencies are read through `deps`, which only permits access to
    /// the projections listed in [`dependencies`](Projection::dependencies).
    ///
    /// # Errors
    /// Returns an error only for engine-level failures. Events missing the
    /// required structure produce [`Computed::Veto`].
    fn compute(&self, record: &EventRecord, deps: &Resolved<'_>) -> Result<Computed<Self::Output>>;
}

// =============================================================================
// Type-Erased View
// =============================================================================

/// Object-safe view of a projection used by the registry arena.
pub(crate) trait ErasedProjection: fmt::Debug + Send + Sync {
    fn erased_kind(&self) -> ProjectionKind;
    fn erased_name(&self) -> &str;
    fn erased_dependencies(&self) -> Vec<Dependency>;
    fn erased_constraints(&self) -> Constraints;
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;

    /// Kind first, then own configuration. Dependencies are not looked at.
    fn erased_compare(&self, other: &dyn ErasedProjection) -> CmpResult;

    fn erased_compute(
        &self,
        record: &EventRecord,
        deps: &Resolved<'_>,
    ) -> Result<Box<dyn Any + Send + Sync>>;
}

impl<P: Projection> ErasedProjection for P {
    fn erased_kind(&self) -> ProjectionKind {
        Projection::kind(self)
    }

    fn erased_name(&self) -> &str {
        Projection::name(self)
    }

    fn erased_dependencies(&self) -> Vec<Dependency> {
        Projection::dependencies(self)
    }

    fn erased_constraints(&self) -> Constraints {
        Projection::constraints(self)
    }

    fn type_name(&self) -> &'static str {
        type_name::<P>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn erased_compare(&self, other: &dyn ErasedProjection) -> CmpResult {
        cmp(&Projection::kind(self), &other.erased_kind()).then_with(|| {
            match other.as_any().downcast_ref::<P>() {
                Some(other) => Projection::compare(self, other),
                // Registry rejects kind collisions, so this only orders
                // values that could never share a kind in a sealed graph.
                None => cmp(type_name::<P>(), other.type_name()),
            }
        })
    }

    fn erased_compute(
        &self,
        record: &EventRecord,
        deps: &Resolved<'_>,
    ) -> Result<Box<dyn Any + Send + Sync>> {
        let computed = Projection::compute(self, record, deps)?;
        Ok(Box::new(computed))
    }
}
