use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::{DashMap, DashSet};
use triode::TypeKey;

use crate::{Dependency, DependencyListener};

/// Identifier of a type in a [`DependencyGraph`], unique per type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Directed edge from a component to one of its dependencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub from: TypeKey,
    pub to: TypeKey,
}

/// Records the types observed by a [`DependencyListener`] and the edges between them.
///
/// The graph only grows. It may be fed from several threads at once.
///
/// ```rust
/// use triode::TypeKey;
/// use triode_gems::{Dependency, DependencyGraph, DependencyListener};
///
/// struct Service;
/// struct Database;
///
/// let graph = DependencyGraph::new();
/// graph.on_dependency(Dependency {
///     component: TypeKey::of::<Service>(),
///     dependency: Some(TypeKey::of::<Database>()),
/// });
/// assert_eq!(graph.dependencies_of(&TypeKey::of::<Service>()), vec![TypeKey::of::<Database>()]);
/// ```
#[derive(Default)]
pub struct DependencyGraph {
    nodes: DashMap<TypeKey, NodeId>,
    edges: DashSet<Edge>,
    next_id: AtomicUsize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `component` and, if present, the edge to `dependency`.
    pub fn add_dependency(&self, component: TypeKey, dependency: Option<TypeKey>) {
        self.add_node(component);
        if let Some(dependency) = dependency {
            self.add_node(dependency);
            if self.edges.insert(Edge {
                from: component,
                to: dependency,
            }) {
                tracing::trace!(%component, %dependency, "Recorded dependency");
            }
        }
    }

    fn add_node(&self, ty: TypeKey) -> NodeId {
        *self
            .nodes
            .entry(ty)
            .or_insert_with(|| NodeId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    /// Node of `ty`, if it has been observed.
    pub fn node(&self, ty: &TypeKey) -> Option<NodeId> {
        self.nodes.get(ty).map(|v| *v)
    }

    /// Every node ordered by id.
    pub fn nodes(&self) -> Vec<(NodeId, TypeKey)> {
        let mut nodes: Vec<_> = self.nodes.iter().map(|v| (*v.value(), *v.key())).collect();
        nodes.sort();
        nodes
    }

    /// Every observed type ordered by node id.
    ///
    /// Ids follow first-seen order only while the graph is fed from one thread.
    pub fn types(&self) -> Vec<TypeKey> {
        self.nodes().into_iter().map(|(_, ty)| ty).collect()
    }

    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<_> = self.edges.iter().map(|v| *v).collect();
        edges.sort();
        edges
    }

    /// Direct dependencies of `ty` ordered by node id.
    pub fn dependencies_of(&self, ty: &TypeKey) -> Vec<TypeKey> {
        let ids: HashMap<TypeKey, NodeId> = self
            .nodes()
            .into_iter()
            .map(|(id, ty)| (ty, id))
            .collect();
        let mut dependencies: Vec<_> = self
            .edges
            .iter()
            .filter(|v| v.from == *ty)
            .map(|v| v.to)
            .collect();
        dependencies.sort_by_key(|v| ids.get(v).copied());
        dependencies
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl DependencyListener for DependencyGraph {
    fn on_dependency(&self, dependency: Dependency) {
        self.add_dependency(dependency.component, dependency.dependency);
    }
}
