//! Gatekeeper for every mutation of a committed graph

use super::edge::Edge;
use super::error::{Endpoint, IntegrityError};
use super::node::{Node, NodeId};
use super::policy::GraphPolicy;
use std::collections::{HashMap, HashSet};

/// A set of committed node ids that edges can be checked against
pub trait IdSet {
    fn contains_id(&self, id: &NodeId) -> bool;
}

impl<V> IdSet for HashMap<NodeId, V> {
    fn contains_id(&self, id: &NodeId) -> bool {
        self.contains_key(id)
    }
}

impl IdSet for HashSet<NodeId> {
    fn contains_id(&self, id: &NodeId) -> bool {
        self.contains(id)
    }
}

/// Validates nodes and edges against the graph's current node set and policy.
///
/// Holds no graph state of its own; the aggregate passes in whatever it
/// considers committed.
#[derive(Debug, Clone, Default)]
pub struct IntegrityIndex {
    policy: GraphPolicy,
}

impl IntegrityIndex {
    pub fn new(policy: GraphPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &GraphPolicy {
        &self.policy
    }

    /// Nodes carry no cross-references, so a constructed node always passes.
    pub fn validate_node(&self, _node: &Node, _existing_ids: &impl IdSet) -> Result<(), IntegrityError> {
        Ok(())
    }

    /// Check evidence, the self-loop rule and both endpoints, in that order.
    pub fn validate_edge(&self, edge: &Edge, existing_ids: &impl IdSet) -> Result<(), IntegrityError> {
        if edge.evidence().is_empty() {
            return Err(IntegrityError::EmptyEvidence {
                kind: edge.kind().to_string(),
                src: edge.src().clone(),
                dst: edge.dst().clone(),
            });
        }

        if edge.is_self_loop() && !self.policy.permits_self_loop(edge.kind()) {
            return Err(IntegrityError::SelfLoopForbidden {
                kind: edge.kind().to_string(),
                node: edge.src().clone(),
            });
        }

        for (endpoint, id) in [(Endpoint::Src, edge.src()), (Endpoint::Dst, edge.dst())] {
            if !existing_ids.contains_id(id) {
                return Err(IntegrityError::DanglingReference {
                    kind: edge.kind().to_string(),
                    endpoint,
                    id: id.clone(),
                });
            }
        }

        Ok(())
    }
}
