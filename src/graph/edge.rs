//! Edge representation with an evidentiary trail

use super::error::ValidationError;
use super::evidence::{EvidenceRef, Source};
use super::node::NodeId;
use super::policy::GraphPolicy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A directed, typed relationship justified by one or more evidence records.
///
/// Evidence order is evidentiary order: the first reference is the one the
/// relationship was originally asserted from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    src: NodeId,
    dst: NodeId,
    /// Relationship type (e.g., "subject", "performer", "part_of")
    kind: String,
    evidence: Vec<Arc<EvidenceRef>>,
}

impl Edge {
    /// Create an edge under the default policy (self-loops permitted)
    pub fn new<I, E>(
        src: impl Into<NodeId>,
        dst: impl Into<NodeId>,
        kind: impl Into<String>,
        evidence: I,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<EvidenceRef>>,
    {
        Self::create(src, dst, kind, evidence, &GraphPolicy::default())
    }

    /// Create an edge, checking evidence and the self-loop rule for its kind.
    ///
    /// Evidence may be given as owned values or as `Arc`s already cited by
    /// other edges; shared references are kept as-is.
    pub fn create<I, E>(
        src: impl Into<NodeId>,
        dst: impl Into<NodeId>,
        kind: impl Into<String>,
        evidence: I,
        policy: &GraphPolicy,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<EvidenceRef>>,
    {
        let src = src.into();
        let dst = dst.into();
        let kind = kind.into();
        let evidence: Vec<Arc<EvidenceRef>> = evidence.into_iter().map(Into::into).collect();

        if evidence.is_empty() {
            return Err(ValidationError::EmptyEvidence { kind, src, dst });
        }
        if src == dst && !policy.permits_self_loop(&kind) {
            return Err(ValidationError::SelfLoopForbidden { kind, node: src });
        }

        Ok(Self {
            src,
            dst,
            kind,
            evidence,
        })
    }

    pub fn src(&self) -> &NodeId {
        &self.src
    }

    pub fn dst(&self) -> &NodeId {
        &self.dst
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Evidence in evidentiary order
    pub fn evidence(&self) -> &[Arc<EvidenceRef>] {
        &self.evidence
    }

    pub fn is_self_loop(&self) -> bool {
        self.src == self.dst
    }

    /// Whether either endpoint is `node_id`
    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.src == node_id || &self.dst == node_id
    }

    /// Whether at least one evidence reference came from `source`
    pub fn cites(&self, source: Source) -> bool {
        self.evidence.iter().any(|e| e.source() == source)
    }

    /// Distinct source kinds backing this edge
    pub fn sources(&self) -> BTreeSet<Source> {
        self.evidence.iter().map(|e| e.source()).collect()
    }

    /// Most recent capture time among the evidence, if any is dated
    pub fn latest_capture(&self) -> Option<DateTime<Utc>> {
        self.evidence.iter().filter_map(|e| e.captured()).max()
    }
}
