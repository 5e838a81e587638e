//! Common test utilities for MedAtlas integration tests
//!
//! Builds small clinical graphs and random edge sets.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use medatlas::{AtlasGraph, Edge, EvidenceRef, Node, Source};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Evidence without URI or capture time
pub fn evidence(source: Source, id: &str) -> EvidenceRef {
    EvidenceRef::new(source, id).unwrap()
}

/// Evidence captured on the given day of August 2024
pub fn dated(source: Source, id: &str, day: u32) -> EvidenceRef {
    evidence(source, id).captured_at(Utc.with_ymd_and_hms(2024, 8, day, 9, 0, 0).unwrap())
}

/// One patient with two observations, an imaging study and a note
///
/// ```text
/// obs/1  -subject->  patient/1   (fhir Observation/1)
/// obs/2  -subject->  patient/1   (fhir Observation/2, lab LAB-77)
/// img/1  -subject->  patient/1   (dicom 1.2.840.1)
/// note/1 -mentions-> obs/2       (note N-5)
/// ```
pub fn clinical_graph() -> AtlasGraph {
    let mut graph = AtlasGraph::new();
    graph.add_node(Node::new("patient/1", "Patient").unwrap().with_property("gender", "female"));
    graph.add_node(Node::new("obs/1", "Observation").unwrap().with_property("code", "8867-4"));
    graph.add_node(Node::new("obs/2", "Observation").unwrap().with_property("code", "2345-7"));
    graph.add_node(Node::new("img/1", "ImagingStudy").unwrap());
    graph.add_node(Node::new("note/1", "Note").unwrap());

    let edges = vec![
        Edge::new("obs/1", "patient/1", "subject", vec![dated(Source::Fhir, "Observation/1", 1)]),
        Edge::new(
            "obs/2",
            "patient/1",
            "subject",
            vec![dated(Source::Fhir, "Observation/2", 2), dated(Source::Lab, "LAB-77", 3)],
        ),
        Edge::new("img/1", "patient/1", "subject", vec![evidence(Source::Dicom, "1.2.840.1")]),
        Edge::new("note/1", "obs/2", "mentions", vec![evidence(Source::Note, "N-5")]),
    ];
    for edge in edges {
        graph.add_edge(edge.unwrap()).unwrap();
    }
    graph
}

/// Deterministic generator of nodes and evidence-backed edges
pub struct RandomGraph {
    rng: StdRng,
    pub node_ids: Vec<String>,
}

impl RandomGraph {
    pub fn new(seed: u64, node_count: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            node_ids: (0..node_count).map(|i| format!("node/{}", i)).collect(),
        }
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.node_ids
            .iter()
            .map(|id| Node::new(id.as_str(), "Entity").unwrap())
            .collect()
    }

    /// An edge between two known nodes carrying 1..=4 references drawn
    /// from a small pool, so some references repeat across edges
    pub fn edge(&mut self) -> Edge {
        let src = self.node_ids.choose(&mut self.rng).unwrap().clone();
        let dst = self.node_ids.choose(&mut self.rng).unwrap().clone();
        let count = self.rng.gen_range(1..=4);
        let evidence: Vec<EvidenceRef> = (0..count).map(|_| self.reference()).collect();
        let kind = ["subject", "mentions", "derived_from"].choose(&mut self.rng).unwrap();
        Edge::new(src.as_str(), dst.as_str(), *kind, evidence).unwrap()
    }

    fn reference(&mut self) -> EvidenceRef {
        let source = *Source::ALL.choose(&mut self.rng).unwrap();
        let id = format!("rec-{}", self.rng.gen_range(0..20));
        evidence(source, &id)
    }
}
