//! Projection registry and sealed projection graph.
//!
//! Setup happens in two phases:
//! - [`ProjectionRegistry`] collects projection definitions into an arena.
//!   Slots may be declared before they are defined so that dependency edges
//!   can point forward; every definition is checked for cycles before it is
//!   accepted.
//! - [`ProjectionGraph`] is the sealed, read-only result. Sealing assigns
//!   every projection an [`IdentityId`] through an ordered index built from
//!   the structural comparison, and memoizes effective constraints.
//!
//! The sealed graph is immutable and can be shared across worker threads.

use std::any::TypeId;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use prism_foundation::{BeamPairs, CmpResult, Error, ErrorKind, Result, cmp};
use tracing::{debug, trace};

use crate::constraint::Constraints;
use crate::projection::{Dependency, ErasedProjection, Handle, Projection, ProjectionId, ProjectionKind};

// =============================================================================
// Identity
// =============================================================================

/// Equivalence class of structurally equal projections.
///
/// Two projections with the same identity compute the same value for every
/// event, so the event cache holds one slot per identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityId(u32);

impl IdentityId {
    /// Raw index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    pub(crate) const fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

// =============================================================================
// Registry
// =============================================================================

struct Slot {
    label: String,
    projection: Option<Box<dyn ErasedProjection>>,
    dependencies: Vec<Dependency>,
}

/// Setup-time collection of projections.
pub struct ProjectionRegistry {
    slots: Vec<Slot>,
    kinds: HashMap<ProjectionKind, (TypeId, &'static str)>,
}

impl Default for ProjectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            kinds: HashMap::new(),
        }
    }

    /// Reserves a slot for a projection defined later.
    ///
    /// The returned handle can be used as a dependency before the slot is
    /// defined. Sealing fails if it never is.
    ///
    /// # Errors
    /// Returns an internal error once every projection id is in use.
    pub fn declare<P: Projection>(&mut self, label: impl Into<String>) -> Result<Handle<P>> {
        let id = u32::try_from(self.slots.len())
            .ok()
            .filter(|&index| index < u32::MAX)
            .map(ProjectionId)
            .ok_or_else(|| Error::internal("projection registry is full"))?;
        self.slots.push(Slot {
            label: label.into(),
            projection: None,
            dependencies: Vec::new(),
        });
        Ok(Handle::new(id))
    }

    /// Defines a previously declared slot.
    ///
    /// # Errors
    /// - `UnknownProjection` if the handle or a dependency is not in this registry
    /// - `AlreadyDefined` if the slot already holds a projection
    /// - `KindCollision` if the kind key is used by another type
    /// - `DependencyCycle` if the projection would depend on itself
    pub fn define<P: Projection>(&mut self, handle: Handle<P>, projection: P) -> Result<Handle<P>> {
        let id = handle.id();
        let slot = self
            .slots
            .get(id.slot())
            .ok_or_else(|| Error::unknown_projection(id.index()))?;
        if slot.projection.is_some() {
            return Err(Error::new(ErrorKind::AlreadyDefined(slot.label.clone())));
        }
        self.check_kind::<P>(Projection::kind(&projection))?;

        let dependencies = Projection::dependencies(&projection);
        for dep in &dependencies {
            if dep.id.slot() >= self.slots.len() {
                return Err(Error::unknown_projection(dep.id.index()).in_frame(self.label_of(id)));
            }
        }
        if let Some(path) = self.find_cycle(id, &dependencies) {
            return Err(Error::dependency_cycle(path));
        }

        self.kinds
            .entry(Projection::kind(&projection))
            .or_insert((TypeId::of::<P>(), std::any::type_name::<P>()));
        debug!(
            projection = %self.label_of(id),
            kind = %Projection::kind(&projection),
            dependencies = dependencies.len(),
            "defined projection"
        );
        let slot = &mut self.slots[id.slot()];
        slot.projection = Some(Box::new(projection));
        slot.dependencies = dependencies;
        Ok(handle)
    }

    /// Declares and defines a projection labelled with its name.
    ///
    /// # Errors
    /// Same as [`register_as`](Self::register_as).
    pub fn register<P: Projection>(&mut self, projection: P) -> Result<Handle<P>> {
        let label = Projection::name(&projection).to_string();
        self.register_as(label, projection)
    }

    /// Declares and defines a projection under an explicit label.
    ///
    /// # Errors
    /// Same as [`declare`](Self::declare) and [`define`](Self::define). A
    /// failed registration leaves no slot behind.
    pub fn register_as<P: Projection>(
        &mut self,
        label: impl Into<String>,
        projection: P,
    ) -> Result<Handle<P>> {
        let handle = self.declare::<P>(label)?;
        match self.define(handle, projection) {
            Ok(handle) => Ok(handle),
            Err(err) => {
                self.slots.pop();
                Err(err)
            }
        }
    }

    /// Number of slots, defined or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if nothing has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Label of a slot.
    #[must_use]
    pub fn label(&self, id: impl Into<ProjectionId>) -> Option<&str> {
        self.slots.get(id.into().slot()).map(|s| s.label.as_str())
    }

    /// Returns true if the slot holds a projection.
    #[must_use]
    pub fn is_defined(&self, id: impl Into<ProjectionId>) -> bool {
        self.slots
            .get(id.into().slot())
            .is_some_and(|s| s.projection.is_some())
    }

    /// Seals the registry into an immutable graph.
    ///
    /// # Errors
    /// - `UndefinedProjection` if a declared slot was never defined
    /// - `ContradictoryCut` or `NoCompatibleBeams` if a projection's
    ///   effective constraints are unsatisfiable
    pub fn seal(self) -> Result<ProjectionGraph> {
        let mut nodes = Vec::with_capacity(self.slots.len());
        for slot in self.slots {
            let Some(projection) = slot.projection else {
                return Err(Error::undefined_projection(slot.label));
            };
            nodes.push(Node {
                label: slot.label,
                projection,
                dependencies: slot.dependencies,
            });
        }

        let (identities, identity_count) = assign_identities(&nodes)?;
        let constraints = effective_constraints(&nodes)?;
        debug!(
            projections = nodes.len(),
            identities = identity_count,
            "sealed projection graph"
        );

        Ok(ProjectionGraph {
            nodes,
            identities,
            identity_count,
            constraints,
        })
    }

    fn label_of(&self, id: ProjectionId) -> &str {
        self.slots.get(id.slot()).map_or("?", |s| s.label.as_str())
    }

    fn check_kind<P: Projection>(&self, kind: ProjectionKind) -> Result<()> {
        match self.kinds.get(&kind) {
            Some((type_id, existing)) if *type_id != TypeId::of::<P>() => {
                Err(Error::new(ErrorKind::KindCollision {
                    kind: kind.key().to_string(),
                    existing: (*existing).to_string(),
                }))
            }
            _ => Ok(()),
        }
    }

    /// Searches the defined dependency edges for a path back to `target`.
    ///
    /// Undefined slots have no edges yet; any cycle through them is caught
    /// when they are defined.
    fn find_cycle(&self, target: ProjectionId, dependencies: &[Dependency]) -> Option<Vec<String>> {
        let mut visited = BTreeSet::new();
        let mut path = vec![target];
        for dep in dependencies {
            if self.cycle_dfs(target, dep.id, &mut visited, &mut path) {
                return Some(path.iter().map(|&id| self.label_of(id).to_string()).collect());
            }
        }
        None
    }

    fn cycle_dfs(
        &self,
        target: ProjectionId,
        current: ProjectionId,
        visited: &mut BTreeSet<ProjectionId>,
        path: &mut Vec<ProjectionId>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if visited.insert(current) {
            for dep in &self.slots[current.slot()].dependencies {
                if self.cycle_dfs(target, dep.id, visited, path) {
                    return true;
                }
            }
        }
        path.pop();
        false
    }
}

impl fmt::Debug for ProjectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionRegistry")
            .field("slots", &self.slots.len())
            .field("kinds", &self.kinds.len())
            .finish()
    }
}

// =============================================================================
// Sealed Graph
// =============================================================================

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) label: String,
    pub(crate) projection: Box<dyn ErasedProjection>,
    pub(crate) dependencies: Vec<Dependency>,
}

/// Immutable, sealed set of projections.
#[derive(Debug)]
pub struct ProjectionGraph {
    nodes: Vec<Node>,
    identities: Vec<IdentityId>,
    identity_count: usize,
    constraints: Vec<Constraints>,
}

impl ProjectionGraph {
    /// Number of projections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph holds no projections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct identities, i.e. of cache slots per event.
    #[must_use]
    pub fn identity_count(&self) -> usize {
        self.identity_count
    }

    /// All projection ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = ProjectionId> + '_ {
        self.nodes.iter().zip(0u32..).map(|(_, index)| ProjectionId(index))
    }

    /// Label of a projection.
    #[must_use]
    pub fn label(&self, id: impl Into<ProjectionId>) -> Option<&str> {
        self.nodes.get(id.into().slot()).map(|n| n.label.as_str())
    }

    /// Kind of a projection.
    ///
    /// # Errors
    /// Returns `UnknownProjection` if the id is not in this graph.
    pub fn kind(&self, id: impl Into<ProjectionId>) -> Result<ProjectionKind> {
        Ok(self.node(id.into())?.projection.erased_kind())
    }

    /// Direct dependencies of a projection.
    ///
    /// # Errors
    /// Returns `UnknownProjection` if the id is not in this graph.
    pub fn dependencies(&self, id: impl Into<ProjectionId>) -> Result<&[Dependency]> {
        Ok(&self.node(id.into())?.dependencies)
    }

    /// Every projection reachable from `id`, excluding `id` itself.
    ///
    /// # Errors
    /// Returns `UnknownProjection` if the id is not in this graph.
    pub fn all_dependencies(&self, id: impl Into<ProjectionId>) -> Result<BTreeSet<ProjectionId>> {
        let id = id.into();
        let mut seen = BTreeSet::new();
        let mut stack: Vec<ProjectionId> =
            self.node(id)?.dependencies.iter().map(|d| d.id).collect();
        while let Some(next) = stack.pop() {
            if seen.insert(next) {
                stack.extend(self.nodes[next.slot()].dependencies.iter().map(|d| d.id));
            }
        }
        Ok(seen)
    }

    /// Identity of a projection.
    ///
    /// # Errors
    /// Returns `UnknownProjection` if the id is not in this graph.
    pub fn identity(&self, id: impl Into<ProjectionId>) -> Result<IdentityId> {
        let id = id.into();
        self.identities
            .get(id.slot())
            .copied()
            .ok_or_else(|| Error::unknown_projection(id.index()))
    }

    /// Returns true if two projections share an identity.
    ///
    /// # Errors
    /// Returns `UnknownProjection` if either id is not in this graph.
    pub fn equivalent(&self, a: impl Into<ProjectionId>, b: impl Into<ProjectionId>) -> Result<bool> {
        Ok(self.identity(a)? == self.identity(b)?)
    }

    /// Structural comparison of two projections.
    ///
    /// Orders by kind, then own configuration, then dependency count, then
    /// each dependency pair by name and recursively by structure.
    ///
    /// # Errors
    /// Returns `UnknownProjection` if either id is not in this graph.
    pub fn compare(&self, a: impl Into<ProjectionId>, b: impl Into<ProjectionId>) -> Result<CmpResult> {
        let (a, b) = (a.into(), b.into());
        self.node(a)?;
        self.node(b)?;
        if self.identities[a.slot()] == self.identities[b.slot()] {
            return Ok(CmpResult::Equal);
        }
        Ok(StructuralOrder::new(&self.nodes).compare(a, b))
    }

    /// Effective constraints of a projection: its own combined with those
    /// of all its dependencies.
    ///
    /// # Errors
    /// Returns `UnknownProjection` if the id is not in this graph.
    pub fn constraints(&self, id: impl Into<ProjectionId>) -> Result<&Constraints> {
        let id = id.into();
        self.constraints
            .get(id.slot())
            .ok_or_else(|| Error::unknown_projection(id.index()))
    }

    /// Beam pairs accepted by every one of several projections.
    ///
    /// Only beams are intersected. The projections are independent views of
    /// the event, so their cuts need not agree with each other.
    ///
    /// # Errors
    /// Returns `UnknownProjection` for a bad id, or `NoCompatibleBeams` if
    /// no beam pair satisfies all.
    pub fn combined_beams<I>(&self, ids: I) -> Result<BeamPairs>
    where
        I: IntoIterator<Item = ProjectionId>,
    {
        let mut labels = Vec::new();
        let mut beams = BeamPairs::any();
        for id in ids {
            beams = beams.intersect(self.constraints(id)?.beams());
            labels.push(self.nodes[id.slot()].label.clone());
        }
        if beams.is_empty() {
            return Err(Error::no_compatible_beams(labels.join(", ")));
        }
        Ok(beams)
    }

    pub(crate) fn node(&self, id: ProjectionId) -> Result<&Node> {
        self.nodes
            .get(id.slot())
            .ok_or_else(|| Error::unknown_projection(id.index()))
    }
}

// =============================================================================
// Sealing
// =============================================================================

/// Structural order over the nodes of one graph.
///
/// Results are memoized per pair, so shared dependencies are compared once
/// however many paths lead to them.
struct StructuralOrder<'n> {
    nodes: &'n [Node],
    memo: HashMap<(ProjectionId, ProjectionId), CmpResult>,
}

impl<'n> StructuralOrder<'n> {
    fn new(nodes: &'n [Node]) -> Self {
        Self {
            nodes,
            memo: HashMap::new(),
        }
    }

    fn compare(&mut self, a: ProjectionId, b: ProjectionId) -> CmpResult {
        if a == b {
            return CmpResult::Equal;
        }
        if let Some(&known) = self.memo.get(&(a, b)) {
            return known;
        }
        let nodes = self.nodes;
        let (na, nb) = (&nodes[a.slot()], &nodes[b.slot()]);
        let mut result = na
            .projection
            .erased_compare(nb.projection.as_ref())
            .then_with(|| cmp(&na.dependencies.len(), &nb.dependencies.len()));
        for (da, db) in na.dependencies.iter().zip(&nb.dependencies) {
            if !result.is_eq() {
                break;
            }
            result = cmp(da.name.as_str(), db.name.as_str()).then_with(|| self.compare(da.id, db.id));
        }
        self.memo.insert((a, b), result);
        self.memo.insert((b, a), result.reverse());
        result
    }
}

/// Canonicalizes projections through an ordered index of representatives.
fn assign_identities(nodes: &[Node]) -> Result<(Vec<IdentityId>, usize)> {
    let mut order = StructuralOrder::new(nodes);
    let mut index: Vec<(ProjectionId, IdentityId)> = Vec::new();
    let mut identities = Vec::with_capacity(nodes.len());

    for (node, id) in nodes.iter().zip((0u32..).map(ProjectionId)) {
        let found = index.binary_search_by(|(rep, _)| order.compare(*rep, id).into());
        let identity = match found {
            Ok(pos) => {
                let (rep, identity) = index[pos];
                trace!(
                    projection = %node.label,
                    shares_with = %nodes[rep.slot()].label,
                    "projection is structurally equal to an earlier one"
                );
                identity
            }
            Err(pos) => {
                let identity = u32::try_from(index.len())
                    .map(IdentityId)
                    .map_err(|_| Error::internal("too many projection identities"))?;
                index.insert(pos, (id, identity));
                identity
            }
        };
        identities.push(identity);
    }

    let count = index.len();
    Ok((identities, count))
}

/// Memoizes effective constraints for every node.
fn effective_constraints(nodes: &[Node]) -> Result<Vec<Constraints>> {
    let mut memo: Vec<Option<Constraints>> = vec![None; nodes.len()];
    for i in 0..nodes.len() {
        effective_for(nodes, i, &mut memo)?;
    }
    Ok(memo.into_iter().map(Option::unwrap_or_default).collect())
}

fn effective_for(nodes: &[Node], i: usize, memo: &mut [Option<Constraints>]) -> Result<Constraints> {
    if let Some(done) = &memo[i] {
        return Ok(done.clone());
    }
    let node = &nodes[i];
    let mut combined = node.projection.erased_constraints();
    for dep in &node.dependencies {
        let theirs = effective_for(nodes, dep.id.slot(), memo)?;
        combined = combined
            .combine(&theirs)
            .map_err(|e| e.in_frame(node.label.clone()))?;
    }
    if combined.beams().is_empty() {
        return Err(Error::no_compatible_beams(node.label.clone()));
    }
    memo[i] = Some(combined.clone());
    Ok(combined)
}
