//! Directed component graph built per analysis
//!
//! One node per selected component, one edge per declared connection whose
//! endpoints are both selected. Nodes are looked up by component id.
//! Building is idempotent: re-adding a node replaces its weight and a
//! repeated connection never creates a parallel edge.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::graph_models::{AttackEdge, ComponentNode};
use crate::inventory::ComponentSource;
use crate::models::{Complexity, Component};

/// Component graph for a single analysis run
#[derive(Debug, Clone, Default)]
pub struct ComponentGraph {
    graph: DiGraph<ComponentNode, AttackEdge>,
    /// Node lookup by component id
    node_index: HashMap<String, NodeIndex>,
}

/// Graph plus the non-fatal problems met while building it
#[derive(Debug, Clone, Default)]
pub struct GraphBuild {
    pub graph: ComponentGraph,
    pub warnings: Vec<String>,
}

/// Edge and node counts for logging and reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub trust_boundary_edges: usize,
    pub low_complexity_edges: usize,
    pub medium_complexity_edges: usize,
    pub high_complexity_edges: usize,
}

impl ComponentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for a component subset.
    ///
    /// Components with an empty connection list fall back to
    /// `source.connections_of`. A failed lookup leaves the node isolated and
    /// is reported as a warning.
    pub fn build(components: &[Component], source: &dyn ComponentSource) -> GraphBuild {
        let mut graph = Self::new();
        let mut warnings = Vec::new();

        for component in components {
            graph.add_node(ComponentNode::from(component));
        }

        for component in components {
            let connections = if component.connections.is_empty() {
                match source.connections_of(&component.id) {
                    Ok(found) => found,
                    Err(e) => {
                        let msg = format!(
                            "Could not resolve connections of '{}': {}; treating it as isolated",
                            component.id, e
                        );
                        warn!("{}", msg);
                        warnings.push(msg);
                        Vec::new()
                    }
                }
            } else {
                component.connections.clone()
            };

            for target in &connections {
                if !graph.add_connection(&component.id, target) {
                    debug!(
                        "Skipping connection {} -> {} (endpoint not selected)",
                        component.id, target
                    );
                }
            }
        }

        debug!(
            "Built component graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        GraphBuild { graph, warnings }
    }

    // ==================== Node Operations ====================

    /// Add a node, replacing the weight of an existing node with the same id
    pub fn add_node(&mut self, node: ComponentNode) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&node.id) {
            if let Some(existing) = self.graph.node_weight_mut(idx) {
                *existing = node;
            }
            return idx;
        }

        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        idx
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    pub fn get_node(&self, id: &str) -> Option<&ComponentNode> {
        self.index_of(id).and_then(|idx| self.graph.node_weight(idx))
    }

    pub fn node_at(&self, idx: NodeIndex) -> Option<&ComponentNode> {
        self.graph.node_weight(idx)
    }

    // ==================== Edge Operations ====================

    /// Connect two selected components.
    ///
    /// Returns false when either endpoint is not in the graph or the
    /// connection is a self-loop. An existing edge is left untouched.
    pub fn add_connection(&mut self, from: &str, to: &str) -> bool {
        let (Some(src), Some(dst)) = (self.index_of(from), self.index_of(to)) else {
            return false;
        };
        if src == dst {
            return false;
        }
        if self.graph.find_edge(src, dst).is_some() {
            return true;
        }

        let edge = AttackEdge::between(&self.graph[src], &self.graph[dst]);
        self.graph.add_edge(src, dst, edge);
        true
    }

    pub fn edge(&self, from: NodeIndex, to: NodeIndex) -> Option<&AttackEdge> {
        self.graph
            .find_edge(from, to)
            .and_then(|e| self.graph.edge_weight(e))
    }

    pub fn edge_by_id(&self, from: &str, to: &str) -> Option<&AttackEdge> {
        self.edge(self.index_of(from)?, self.index_of(to)?)
    }

    /// Outgoing neighbours in ascending index (insertion) order
    pub fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut next: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.target())
            .collect();
        next.sort();
        next
    }

    /// Rewrite edges in place.
    ///
    /// `f` sees both endpoints and the current edge and returns a replacement
    /// when the edge should change. Returns the number of edges replaced.
    pub fn update_edges<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&ComponentNode, &ComponentNode, &AttackEdge) -> Option<AttackEdge>,
    {
        let edge_ids: Vec<EdgeIndex> = self.graph.edge_indices().collect();
        let mut changed = 0;

        for e in edge_ids {
            let Some((a, b)) = self.graph.edge_endpoints(e) else {
                continue;
            };
            if let Some(replacement) = f(&self.graph[a], &self.graph[b], &self.graph[e]) {
                self.graph[e] = replacement;
                changed += 1;
            }
        }

        changed
    }

    /// All edges as `(source id, target id, edge)`, sorted by endpoint ids
    pub fn edges(&self) -> Vec<(String, String, AttackEdge)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].id.clone(),
                    self.graph[e.target()].id.clone(),
                    e.weight().clone(),
                )
            })
            .collect();
        edges.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        edges
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            ..Default::default()
        };

        for edge in self.graph.edge_weights() {
            if edge.trust_boundary {
                stats.trust_boundary_edges += 1;
            }
            match edge.complexity {
                Complexity::Low => stats.low_complexity_edges += 1,
                Complexity::Medium => stats.medium_complexity_edges += 1,
                Complexity::High => stats.high_complexity_edges += 1,
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests;
