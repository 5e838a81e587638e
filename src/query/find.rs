//! Find queries for locating nodes

use super::types::QueryResult;
use crate::graph::{AtlasGraph, Node, PropertyValue};

/// Query for finding nodes by various criteria
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    /// Filter by node kind (e.g., "Patient", "Observation")
    pub kind: Option<String>,
    /// Filter by payload key existence
    pub has_property: Option<String>,
    /// Filter by payload key-value match
    pub property_equals: Option<(String, PropertyValue)>,
    /// Maximum number of results
    pub limit: Option<usize>,
    /// Number of results to skip
    pub offset: Option<usize>,
}

impl FindQuery {
    /// Create a new empty query (matches all nodes)
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by node kind
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Filter by payload key existence
    pub fn with_property(mut self, key: impl Into<String>) -> Self {
        self.has_property = Some(key.into());
        self
    }

    /// Filter by payload value
    pub fn with_property_value(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.property_equals = Some((key.into(), value.into()));
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip results (for pagination)
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Execute the query against a graph. Results are ordered by node id.
    pub fn execute(&self, graph: &AtlasGraph) -> QueryResult {
        let mut nodes: Vec<Node> = graph
            .nodes()
            .filter(|node| self.matches(node))
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.id().cmp(b.id()));

        let total_count = nodes.len();

        let nodes = nodes
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();

        QueryResult { nodes, total_count }
    }

    /// Check if a node matches all query criteria
    fn matches(&self, node: &Node) -> bool {
        if let Some(ref expected_kind) = self.kind {
            if node.kind() != expected_kind {
                return false;
            }
        }

        if let Some(ref key) = self.has_property {
            if node.property(key).is_none() {
                return false;
            }
        }

        if let Some((ref key, ref expected_value)) = self.property_equals {
            match node.property(key) {
                Some(value) if value == expected_value => {}
                _ => return false,
            }
        }

        true
    }
}
