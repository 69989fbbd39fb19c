//! Dependency graph and cycle detection.
//!
//! Built per agent from resolved artifacts' declared sub-dependencies, and
//! used only for cycle detection. Cycles are surfaced as warnings: they do
//! not block conversion, only flag the dependency set for human review.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A cycle found in an agent's dependency graph.
///
/// The path is the inclusive cycle slice: it starts and ends on the same
/// node (e.g. `[a, b, c, a]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleWarning {
    /// Node identities along the cycle, first node repeated at the end.
    pub path: Vec<String>,
}

impl std::fmt::Display for CycleWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.join(" -> "))
    }
}

/// Directed dependency graph keyed by artifact identity.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Node -> ordered, deduplicated successor list.
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a node exists.
    pub fn add_node(&mut self, node: impl Into<String>) {
        self.edges.entry(node.into()).or_default();
    }

    /// Add a directed edge. Duplicate edges are ignored.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let from = from.into();
        let to = to.into();
        self.add_node(to.clone());
        let successors = self.edges.entry(from).or_default();
        if !successors.contains(&to) {
            successors.push(to);
        }
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn successors(&self, node: &str) -> &[String] {
        self.edges.get(node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Find cycles reachable from `root` by depth-first traversal.
    ///
    /// Uses an explicit work stack where each entry carries its own path
    /// vector, so no traversal state is shared across entries. When a
    /// successor already appears on the current path, the cycle is the path
    /// slice from that occurrence through the current node, inclusive.
    /// Cycles are deduplicated by rotation so the same loop reached twice is
    /// reported once.
    pub fn find_cycles(&self, root: &str) -> Vec<CycleWarning> {
        let mut warnings = Vec::new();
        let mut reported: HashSet<Vec<String>> = HashSet::new();
        let mut expanded: HashSet<String> = HashSet::new();
        let mut work = vec![(root.to_string(), vec![root.to_string()])];

        while let Some((node, path)) = work.pop() {
            if !expanded.insert(node.clone()) {
                continue;
            }
            for next in self.successors(&node) {
                if let Some(pos) = path.iter().position(|n| n == next) {
                    let mut cycle = path[pos..].to_vec();
                    cycle.push(next.clone());
                    if reported.insert(rotation_signature(&cycle)) {
                        tracing::warn!(cycle = %cycle.join(" -> "), "dependency cycle detected");
                        warnings.push(CycleWarning { path: cycle });
                    }
                } else if !expanded.contains(next) {
                    let mut next_path = path.clone();
                    next_path.push(next.clone());
                    work.push((next.clone(), next_path));
                }
            }
        }
        warnings
    }
}

/// Canonical rotation of a cycle (without the repeated tail node), used to
/// recognize the same loop entered at different points.
fn rotation_signature(cycle: &[String]) -> Vec<String> {
    let nodes = &cycle[..cycle.len() - 1];
    if nodes.is_empty() {
        return Vec::new();
    }
    let min_pos = nodes
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut rotated = Vec::with_capacity(nodes.len());
    rotated.extend_from_slice(&nodes[min_pos..]);
    rotated.extend_from_slice(&nodes[..min_pos]);
    rotated
}
