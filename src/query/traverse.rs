//! Graph traversal operations

use super::types::TraversalResult;
use crate::graph::{AtlasGraph, Direction, Edge, Node, NodeId, Source};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Query for traversing the graph from a starting node
#[derive(Debug, Clone)]
pub struct TraverseQuery {
    /// Starting node ID
    pub origin: NodeId,
    /// Maximum depth to traverse (0 = origin only, 1 = immediate neighbors, etc.)
    pub max_depth: usize,
    /// Direction to traverse edges
    pub direction: Direction,
    /// Optional edge kind filter
    pub kind: Option<String>,
    /// Only follow edges citing this source
    pub source: Option<Source>,
    /// Only follow edges with evidence captured at or after this time
    pub captured_since: Option<DateTime<Utc>>,
}

impl TraverseQuery {
    /// Create a new traversal query from a starting node
    pub fn from(origin: impl Into<NodeId>) -> Self {
        Self {
            origin: origin.into(),
            max_depth: 1,
            direction: Direction::Outgoing,
            kind: None,
            source: None,
            captured_since: None,
        }
    }

    /// Set the maximum traversal depth
    pub fn depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the traversal direction
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Filter by edge kind
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Only follow relationships substantiated by `source`
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    /// Only follow relationships with evidence captured at or after `since`
    pub fn captured_since(mut self, since: DateTime<Utc>) -> Self {
        self.captured_since = Some(since);
        self
    }

    /// Execute the traversal against a graph
    pub fn execute(&self, graph: &AtlasGraph) -> TraversalResult {
        let mut result = TraversalResult::new(self.origin.clone());

        let Some(origin_node) = graph.get_node(&self.origin) else {
            return result;
        };

        // BFS traversal
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut current_level: Vec<NodeId> = vec![self.origin.clone()];
        visited.insert(self.origin.clone());

        // Level 0 is the origin
        result.levels.push(vec![origin_node.clone()]);

        for _depth in 0..self.max_depth {
            if current_level.is_empty() {
                break;
            }

            let mut next_level: Vec<NodeId> = Vec::new();
            let mut level_nodes: Vec<Node> = Vec::new();

            for node_id in &current_level {
                for edge in graph.neighbors(node_id, self.direction, self.kind.as_deref()) {
                    if !self.edge_matches(edge) {
                        continue;
                    }

                    let neighbor_id = if edge.src() == node_id {
                        edge.dst()
                    } else {
                        edge.src()
                    };

                    if visited.contains(neighbor_id) {
                        continue;
                    }

                    if let Some(neighbor) = graph.get_node(neighbor_id) {
                        visited.insert(neighbor_id.clone());
                        next_level.push(neighbor_id.clone());
                        level_nodes.push(neighbor.clone());
                        result.edges.push(edge.clone());
                    }
                }
            }

            if !level_nodes.is_empty() {
                result.levels.push(level_nodes);
            }
            current_level = next_level;
        }

        result
    }

    /// Check the evidence filters; kind is already applied by `neighbors`
    fn edge_matches(&self, edge: &Edge) -> bool {
        if let Some(source) = self.source {
            if !edge.cites(source) {
                return false;
            }
        }

        if let Some(since) = self.captured_since {
            match edge.latest_capture() {
                Some(at) if at >= since => {}
                _ => return false,
            }
        }

        true
    }
}
