//! Construction and commit errors

use super::node::NodeId;
use thiserror::Error;

/// Malformed input detected while constructing a value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("node id must not be empty")]
    EmptyNodeId,

    #[error("evidence id must not be empty")]
    EmptyEvidenceId,

    #[error("edge '{kind}' from {src} to {dst} has no evidence")]
    EmptyEvidence { kind: String, src: NodeId, dst: NodeId },

    #[error("self-loops are not permitted for edge kind '{kind}' (node {node})")]
    SelfLoopForbidden { kind: String, node: NodeId },

    #[error("unknown evidence source: {0}")]
    UnknownSource(String),
}

/// Which end of an edge failed a reference check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Src,
    Dst,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Src => f.write_str("src"),
            Endpoint::Dst => f.write_str("dst"),
        }
    }
}

/// A mutation that would break a graph invariant. The graph is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("edge '{kind}' references missing {endpoint} node {id}")]
    DanglingReference {
        kind: String,
        endpoint: Endpoint,
        id: NodeId,
    },

    #[error("edge '{kind}' from {src} to {dst} has no evidence")]
    EmptyEvidence { kind: String, src: NodeId, dst: NodeId },

    #[error("self-loops are not permitted for edge kind '{kind}' (node {node})")]
    SelfLoopForbidden { kind: String, node: NodeId },

    #[error("node not found: {0}")]
    UnknownNode(NodeId),

    #[error("node {0} appears more than once in snapshot")]
    DuplicateNode(NodeId),
}
