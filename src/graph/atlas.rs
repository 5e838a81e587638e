//! AtlasGraph: the provenance-tracked aggregate of nodes and edges

use super::adjacency::{Adjacency, Direction, Neighbors};
use super::edge::Edge;
use super::error::IntegrityError;
use super::evidence::{EvidenceRef, Source};
use super::integrity::IntegrityIndex;
use super::node::{Node, NodeId, Properties};
use super::policy::GraphPolicy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Portable form of a graph: every node, every edge in insertion order, and
/// the policy the owner committed them under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub policy: GraphPolicy,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Parse a JSON snapshot, applying `fallback` only when the document has
    /// no `policy` key. An explicit policy, even the default one, is kept.
    pub fn from_json(json: &str, fallback: &GraphPolicy) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let has_policy = value.get("policy").is_some();
        let mut snapshot: GraphSnapshot = serde_json::from_value(value)?;
        if !has_policy {
            snapshot.policy = fallback.clone();
        }
        Ok(snapshot)
    }
}

/// The graph aggregate.
///
/// Nodes and edges only enter through [`AtlasGraph::add_node`] and
/// [`AtlasGraph::add_edge`], which consult the [`IntegrityIndex`] before
/// committing. Committed data is never removed.
#[derive(Debug, Clone, Default)]
pub struct AtlasGraph {
    nodes: HashMap<NodeId, Node>,
    edges: Vec<Edge>,
    adjacency: Adjacency,
    integrity: IntegrityIndex,
}

impl AtlasGraph {
    /// Create an empty graph with the default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph governed by `policy`
    pub fn with_policy(policy: GraphPolicy) -> Self {
        Self {
            integrity: IntegrityIndex::new(policy),
            ..Default::default()
        }
    }

    pub fn policy(&self) -> &GraphPolicy {
        self.integrity.policy()
    }

    /// Insert a node unless its id is already present.
    ///
    /// Returns `false` without touching the existing node on a repeat id.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(node.id()) {
            debug!(node = %node.id(), "node already present, keeping first insert");
            return false;
        }
        if let Err(e) = self.integrity.validate_node(&node, &self.nodes) {
            warn!(node = %node.id(), error = %e, "node rejected");
            return false;
        }
        debug!(node = %node.id(), kind = node.kind(), "node committed");
        self.nodes.insert(node.id().clone(), node);
        true
    }

    /// Run the commit checks for `edge` without committing it
    pub fn check_edge(&self, edge: &Edge) -> Result<(), IntegrityError> {
        self.integrity.validate_edge(edge, &self.nodes)
    }

    /// Validate and append an edge. On error nothing is committed.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), IntegrityError> {
        if let Err(e) = self.check_edge(&edge) {
            warn!(src = %edge.src(), dst = %edge.dst(), kind = edge.kind(), error = %e, "edge rejected");
            return Err(e);
        }
        let position = self.edges.len();
        self.adjacency.record(position, &edge);
        debug!(
            src = %edge.src(),
            dst = %edge.dst(),
            kind = edge.kind(),
            evidence = edge.evidence().len(),
            "edge committed"
        );
        self.edges.push(edge);
        Ok(())
    }

    /// Merge payload fields into an existing node
    pub fn update_payload(&mut self, node_id: &NodeId, merge: Properties) -> Result<(), IntegrityError> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| IntegrityError::UnknownNode(node_id.clone()))?;
        node.update_payload(merge);
        debug!(node = %node_id, "payload updated");
        Ok(())
    }

    /// Get a node by ID
    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get all nodes (unordered)
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges touching `node_id` in the given direction, optionally of one kind.
    ///
    /// Unknown nodes yield an empty sequence.
    pub fn neighbors<'a>(
        &'a self,
        node_id: &NodeId,
        direction: Direction,
        kind: Option<&'a str>,
    ) -> Neighbors<'a> {
        self.adjacency.neighbors(&self.edges, node_id, direction, kind)
    }

    /// The evidence an edge was committed with, verbatim and in order
    pub fn evidence_for<'e>(&self, edge: &'e Edge) -> &'e [Arc<EvidenceRef>] {
        edge.evidence()
    }

    /// Union of the evidence on every edge touching `node_id`
    pub fn trace(&self, node_id: &NodeId) -> BTreeSet<Arc<EvidenceRef>> {
        self.neighbors(node_id, Direction::Both, None)
            .flat_map(|edge| edge.evidence().iter().cloned())
            .collect()
    }

    /// Edges with at least one evidence reference from `source`
    pub fn filter_by_source(&self, source: Source) -> impl Iterator<Item = &Edge> + Clone + '_ {
        self.edges.iter().filter(move |edge| edge.cites(source))
    }

    /// Export every node (sorted by id) and edge (insertion order)
    pub fn snapshot(&self) -> GraphSnapshot {
        let mut nodes: Vec<Node> = self.nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.id().cmp(b.id()));
        GraphSnapshot {
            policy: self.policy().clone(),
            nodes,
            edges: self.edges.clone(),
        }
    }

    /// Rebuild a graph by replaying a snapshot through the integrity gate.
    ///
    /// Unlike `add_node`, a repeated node id is an error.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, IntegrityError> {
        let mut graph = Self::with_policy(snapshot.policy);
        let mut seen: HashSet<NodeId> = HashSet::with_capacity(snapshot.nodes.len());
        for node in snapshot.nodes {
            if !seen.insert(node.id().clone()) {
                return Err(IntegrityError::DuplicateNode(node.id().clone()));
            }
            graph.add_node(node);
        }
        for edge in snapshot.edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }
}
