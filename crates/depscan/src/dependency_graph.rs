//! Module-level dependency graph
//!
//! Nodes are local module ids, an edge `a -> b` means module `a` imports local module
//! `b`. Edges have set semantics and self-edges are kept. Storage is a petgraph
//! `DiGraph` so the standard algorithms (cyclicity, Tarjan SCC) apply directly.

use indexmap::IndexMap;
use petgraph::{
    algo::{is_cyclic_directed, tarjan_scc},
    graph::{DiGraph, NodeIndex},
};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_indices: FxHashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(from, to)` pairs
    pub fn from_edges<'e>(edges: impl IntoIterator<Item = (&'e str, &'e str)>) -> Self {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.add_dependency(from, to);
        }
        graph
    }

    /// Add a module node, returning the existing node if already present
    pub fn add_module(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_owned());
        self.node_indices.insert(name.to_owned(), idx);
        idx
    }

    /// Record that `from` imports `to`; returns false if the edge already existed
    pub fn add_dependency(&mut self, from: &str, to: &str) -> bool {
        let from_idx = self.add_module(from);
        let to_idx = self.add_module(to);
        if self.graph.contains_edge(from_idx, to_idx) {
            return false;
        }
        self.graph.add_edge(from_idx, to_idx, ());
        true
    }

    pub fn contains_module(&self, name: &str) -> bool {
        self.node_indices.contains_key(name)
    }

    pub fn contains_dependency(&self, from: &str, to: &str) -> bool {
        match (self.node_indices.get(from), self.node_indices.get(to)) {
            (Some(&from_idx), Some(&to_idx)) => self.graph.contains_edge(from_idx, to_idx),
            _ => false,
        }
    }

    pub fn module_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All module ids, sorted
    pub fn modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = self.graph.node_weights().map(String::as_str).collect();
        modules.sort_unstable();
        modules
    }

    /// Direct local dependencies of a module, sorted
    pub fn dependencies(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(name) else {
            return Vec::new();
        };
        let mut deps: Vec<&str> = self
            .graph
            .neighbors(idx)
            .map(|neighbor| self.graph[neighbor].as_str())
            .collect();
        deps.sort_unstable();
        deps
    }

    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Strongly connected components that contain a cycle: more than one member, or
    /// a single module importing itself. Members and components are sorted.
    pub fn strongly_connected_components(&self) -> Vec<Vec<String>> {
        let mut components: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| match component.as_slice() {
                [single] => self.graph.contains_edge(*single, *single),
                _ => true,
            })
            .map(|component| {
                let mut names: Vec<String> = component
                    .into_iter()
                    .map(|idx| self.graph[idx].clone())
                    .collect();
                names.sort_unstable();
                names
            })
            .collect();
        components.sort_unstable();
        components
    }

    /// Adjacency lists keyed by module id, both levels sorted
    pub fn to_adjacency(&self) -> IndexMap<String, Vec<String>> {
        self.modules()
            .into_iter()
            .map(|module| {
                let deps = self
                    .dependencies(module)
                    .into_iter()
                    .map(str::to_owned)
                    .collect();
                (module.to_owned(), deps)
            })
            .collect()
    }
}
