//! Query types and result structures

use crate::graph::{Edge, EvidenceRef, Node, NodeId};
use std::sync::Arc;

/// Result of a find query
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Nodes matching the query
    pub nodes: Vec<Node>,
    /// Total count (may differ from nodes.len() if limit applied)
    pub total_count: usize,
}

/// Result of a traversal query
#[derive(Debug, Clone)]
pub struct TraversalResult {
    /// Starting node
    pub origin: NodeId,
    /// Nodes discovered at each depth level
    /// Level 0 = origin, Level 1 = immediate neighbors, etc.
    pub levels: Vec<Vec<Node>>,
    /// Edges traversed
    pub edges: Vec<Edge>,
}

impl TraversalResult {
    pub fn new(origin: NodeId) -> Self {
        Self {
            origin,
            levels: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Get all nodes across all levels (excluding origin)
    pub fn all_nodes(&self) -> Vec<&Node> {
        self.levels.iter().skip(1).flatten().collect()
    }

    /// Get nodes at a specific depth
    pub fn at_depth(&self, depth: usize) -> &[Node] {
        self.levels.get(depth).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get the maximum depth reached
    pub fn max_depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }
}

/// One piece of evidence in a provenance trail, with the edges citing it
#[derive(Debug, Clone)]
pub struct TraceEntry {
    pub evidence: Arc<EvidenceRef>,
    /// Edges touching the traced node that cite this evidence, in insertion order
    pub edges: Vec<Edge>,
}

/// Provenance trail for a node
#[derive(Debug, Clone)]
pub struct EvidenceTrail {
    pub node: NodeId,
    /// Most recently captured first; undated evidence last
    pub entries: Vec<TraceEntry>,
}

impl EvidenceTrail {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The evidence references alone, in trail order
    pub fn evidence(&self) -> impl Iterator<Item = &Arc<EvidenceRef>> {
        self.entries.iter().map(|e| &e.evidence)
    }
}
