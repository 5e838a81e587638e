//! Provenance trails: which records justify what we know about a node

use super::types::{EvidenceTrail, TraceEntry};
use crate::graph::{AtlasGraph, Direction, Edge, EvidenceRef, NodeId, Source};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Query for the evidence behind every relationship touching a node
#[derive(Debug, Clone)]
pub struct TraceQuery {
    pub node: NodeId,
    /// Restrict to evidence from one source kind
    pub source: Option<Source>,
    /// Lower bound on capture time (inclusive); excludes undated evidence
    pub captured_since: Option<DateTime<Utc>>,
    /// Upper bound on capture time (exclusive); excludes undated evidence
    pub captured_before: Option<DateTime<Utc>>,
    /// Restrict to edges of one kind
    pub kind: Option<String>,
}

impl TraceQuery {
    pub fn new(node: impl Into<NodeId>) -> Self {
        Self {
            node: node.into(),
            source: None,
            captured_since: None,
            captured_before: None,
            kind: None,
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn captured_since(mut self, since: DateTime<Utc>) -> Self {
        self.captured_since = Some(since);
        self
    }

    pub fn captured_before(mut self, before: DateTime<Utc>) -> Self {
        self.captured_before = Some(before);
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Execute the trace against a graph.
    ///
    /// Entries are deduplicated by value and sorted most recent capture
    /// first, undated last, then by source and record id.
    pub fn execute(&self, graph: &AtlasGraph) -> EvidenceTrail {
        let mut entries: Vec<TraceEntry> = Vec::new();
        let mut index: HashMap<Arc<EvidenceRef>, usize> = HashMap::new();
        // Last committed edge that cited each entry, compared by identity
        let mut last_cited: Vec<&Edge> = Vec::new();

        for edge in graph.neighbors(&self.node, Direction::Both, self.kind.as_deref()) {
            for evidence in edge.evidence() {
                if !self.evidence_matches(evidence) {
                    continue;
                }
                match index.get(evidence) {
                    Some(&i) => {
                        // An edge citing the same record twice is listed once
                        if !std::ptr::eq(last_cited[i], edge) {
                            last_cited[i] = edge;
                            entries[i].edges.push(edge.clone());
                        }
                    }
                    None => {
                        index.insert(Arc::clone(evidence), entries.len());
                        last_cited.push(edge);
                        entries.push(TraceEntry {
                            evidence: Arc::clone(evidence),
                            edges: vec![edge.clone()],
                        });
                    }
                }
            }
        }

        entries.sort_by(|a, b| recency_order(&a.evidence, &b.evidence));

        EvidenceTrail {
            node: self.node.clone(),
            entries,
        }
    }

    fn evidence_matches(&self, evidence: &EvidenceRef) -> bool {
        if let Some(source) = self.source {
            if evidence.source() != source {
                return false;
            }
        }
        if self.captured_since.is_none() && self.captured_before.is_none() {
            return true;
        }
        let Some(at) = evidence.captured() else {
            return false;
        };
        if let Some(since) = self.captured_since {
            if at < since {
                return false;
            }
        }
        if let Some(before) = self.captured_before {
            if at >= before {
                return false;
            }
        }
        true
    }
}

/// Newest first, undated last, then source and id for a stable order
fn recency_order(a: &EvidenceRef, b: &EvidenceRef) -> Ordering {
    match (a.captured(), b.captured()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.source().cmp(&b.source()))
    .then_with(|| a.id().cmp(b.id()))
}
