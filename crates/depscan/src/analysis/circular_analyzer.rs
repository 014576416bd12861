//! Circular dependency analyzer
//!
//! Cycles are enumerated with a depth-first search using three-color marking. A
//! search starts from every module that is still white; a gray neighbor closes a cycle
//! along the current path. Black modules are never re-entered, so a cycle that can
//! only be reached through a module finished by an earlier branch is not reported as
//! a separate path. The strongly connected components computed alongside are
//! exhaustive and list every module that takes part in some cycle.

use indexmap::IndexSet;
use log::debug;
use rustc_hash::FxHashMap;

use super::circular_deps::{CircularDependencyAnalysis, Cycle};
use crate::dependency_graph::DependencyGraph;

/// Node color during cycle search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White, // Not visited
    Gray,  // On the current path
    Black, // Finished visiting
}

/// State threaded through the search
struct CycleSearchState<'a> {
    visited: FxHashMap<&'a str, Color>,
    path: Vec<&'a str>,
    cycles: IndexSet<Cycle>,
}

impl<'a> CycleSearchState<'a> {
    /// Record the cycle closed by an edge back to `target`, which is on the path
    fn record_cycle(&mut self, target: &'a str) {
        let Some(start_pos) = self.path.iter().position(|&n| n == target) else {
            return;
        };
        let members = self.path[start_pos..]
            .iter()
            .map(|&n| n.to_owned())
            .collect();
        if let Some(cycle) = Cycle::from_members(members) {
            let cycle = cycle.normalized();
            debug!("Cycle detected: {cycle}");
            self.cycles.insert(cycle);
        }
    }
}

/// A module on the DFS stack and the position of its next unvisited dependency
struct Frame<'a> {
    node: &'a str,
    dependencies: Vec<&'a str>,
    next: usize,
}

/// Analyzer for circular dependencies
#[derive(Debug)]
pub struct CircularDependencyAnalyzer<'a> {
    graph: &'a DependencyGraph,
}

impl<'a> CircularDependencyAnalyzer<'a> {
    /// Create a new analyzer for the given graph
    pub fn new(graph: &'a DependencyGraph) -> Self {
        Self { graph }
    }

    /// Find cycles and strongly connected components
    pub fn analyze(&self) -> CircularDependencyAnalysis {
        let cycles = self.find_cycles();
        let components = self.graph.strongly_connected_components();
        let largest_cycle_size = cycles.iter().map(Cycle::size).max().unwrap_or(0);

        debug!(
            "Found {} cycles in {} strongly connected components",
            cycles.len(),
            components.len()
        );

        CircularDependencyAnalysis {
            cycles,
            components,
            largest_cycle_size,
        }
    }

    /// Normalized, deduplicated cycles in discovery order
    pub fn find_cycles(&self) -> Vec<Cycle> {
        if !self.graph.has_cycles() {
            return Vec::new();
        }

        let modules = self.graph.modules();
        let mut state = CycleSearchState {
            visited: modules.iter().map(|&module| (module, Color::White)).collect(),
            path: Vec::new(),
            cycles: IndexSet::new(),
        };

        for module in modules {
            if state.visited.get(module) == Some(&Color::White) {
                self.dfs_find_cycles(module, &mut state);
            }
        }

        state.cycles.into_iter().collect()
    }

    /// Iterative DFS from `start`; the path and colors live in `state`
    fn dfs_find_cycles(&self, start: &'a str, state: &mut CycleSearchState<'a>) {
        let mut stack = vec![self.enter(start, state)];

        while let Some(frame) = stack.last_mut() {
            let Some(&neighbor) = frame.dependencies.get(frame.next) else {
                let node = frame.node;
                stack.pop();
                state.path.pop();
                state.visited.insert(node, Color::Black);
                continue;
            };
            frame.next += 1;

            match state.visited.get(neighbor).copied().unwrap_or(Color::White) {
                Color::White => stack.push(self.enter(neighbor, state)),
                Color::Gray => state.record_cycle(neighbor),
                Color::Black => {} // Already processed
            }
        }
    }

    fn enter(&self, node: &'a str, state: &mut CycleSearchState<'a>) -> Frame<'a> {
        state.visited.insert(node, Color::Gray);
        state.path.push(node);
        Frame {
            node,
            dependencies: self.graph.dependencies(node),
            next: 0,
        }
    }
}
