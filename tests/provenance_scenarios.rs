//! Provenance guarantees of the atlas graph, checked end to end
//!
//! Run with: `cargo test --test provenance_scenarios`

mod common;

use common::{clinical_graph, dated, evidence, RandomGraph};
use medatlas::{
    AtlasEngine, AtlasError, AtlasGraph, Direction, Edge, Endpoint, EvidenceRef, GraphId,
    GraphPolicy, IntegrityError, Node, NodeId, Source, TraceQuery, ValidationError,
};
use std::collections::BTreeSet;
use std::sync::Arc;

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn observation_linked_to_patient() {
    let mut graph = AtlasGraph::new();
    graph.add_node(Node::new("patient/1", "Patient").unwrap());
    graph.add_node(Node::new("obs/1", "Observation").unwrap());

    let edge = Edge::new(
        "obs/1",
        "patient/1",
        "subject",
        vec![evidence(Source::Fhir, "Observation/1")],
    )
    .unwrap();
    graph.add_edge(edge.clone()).unwrap();

    let patient = NodeId::from("patient/1");
    let incoming: Vec<&Edge> = graph.neighbors(&patient, Direction::Incoming, None).collect();
    assert_eq!(incoming, vec![&edge]);

    let trace = graph.trace(&patient);
    let expected: BTreeSet<Arc<EvidenceRef>> =
        [Arc::new(evidence(Source::Fhir, "Observation/1"))].into_iter().collect();
    assert_eq!(trace, expected);
}

#[test]
fn edge_from_unknown_observation_is_rejected() {
    let mut graph = clinical_graph();
    let before = graph.edge_count();

    let edge = Edge::new(
        "obs/99",
        "patient/1",
        "subject",
        vec![evidence(Source::Fhir, "Observation/99")],
    )
    .unwrap();
    let err = graph.add_edge(edge).unwrap_err();

    assert_eq!(
        err,
        IntegrityError::DanglingReference {
            kind: "subject".to_string(),
            endpoint: Endpoint::Src,
            id: NodeId::from("obs/99"),
        }
    );
    assert_eq!(graph.edge_count(), before);

    // Still usable after the rejection
    let ok = Edge::new("obs/1", "obs/2", "derived_from", vec![evidence(Source::Lab, "LAB-1")]).unwrap();
    graph.add_edge(ok).unwrap();
    assert_eq!(graph.edge_count(), before + 1);
}

#[test]
fn dangling_destination_is_reported() {
    let mut graph = clinical_graph();
    let edge = Edge::new("obs/1", "patient/2", "subject", vec![evidence(Source::Fhir, "x")]).unwrap();
    match graph.add_edge(edge) {
        Err(IntegrityError::DanglingReference { endpoint, id, .. }) => {
            assert_eq!(endpoint, Endpoint::Dst);
            assert_eq!(id.as_str(), "patient/2");
        }
        other => panic!("expected dangling destination, got {:?}", other),
    }
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn repeated_node_insertion_is_idempotent() {
    let generator = RandomGraph::new(7, 30);
    let mut once = AtlasGraph::new();
    let mut twice = AtlasGraph::new();
    for node in generator.nodes() {
        assert!(once.add_node(node.clone()));
        assert!(twice.add_node(node.clone()));
        assert!(!twice.add_node(node));
    }
    assert_eq!(once.snapshot(), twice.snapshot());
}

#[test]
fn first_insert_of_a_node_wins() {
    let mut graph = clinical_graph();
    let replacement = Node::new("patient/1", "Practitioner").unwrap();
    assert!(!graph.add_node(replacement));

    let patient = graph.get_node(&"patient/1".into()).unwrap();
    assert_eq!(patient.kind(), "Patient");
    assert!(patient.property("gender").is_some());
}

#[test]
fn edges_without_evidence_cannot_be_built() {
    let err = Edge::new("obs/1", "patient/1", "subject", Vec::<EvidenceRef>::new()).unwrap_err();
    assert!(matches!(err, ValidationError::EmptyEvidence { .. }));
}

#[test]
fn deserialized_edge_without_evidence_is_rejected_at_commit() {
    let mut graph = clinical_graph();
    let before = graph.edge_count();
    let edge: Edge = serde_json::from_value(serde_json::json!({
        "src": "obs/1",
        "dst": "patient/1",
        "kind": "subject",
        "evidence": []
    }))
    .unwrap();

    let err = graph.add_edge(edge).unwrap_err();
    assert!(matches!(err, IntegrityError::EmptyEvidence { .. }));
    assert_eq!(graph.edge_count(), before);
}

#[test]
fn evidence_comes_back_in_construction_order() {
    let mut generator = RandomGraph::new(11, 12);
    let mut graph = AtlasGraph::new();
    for node in generator.nodes() {
        graph.add_node(node);
    }

    let mut given = Vec::new();
    for _ in 0..200 {
        let edge = generator.edge();
        given.push(edge.evidence().to_vec());
        graph.add_edge(edge).unwrap();
    }

    for (edge, expected) in graph.edges().iter().zip(&given) {
        assert_eq!(graph.evidence_for(edge), expected.as_slice());
    }
}

#[test]
fn trace_is_union_of_incident_evidence() {
    for seed in 0..5 {
        let mut generator = RandomGraph::new(seed, 10);
        let mut graph = AtlasGraph::new();
        for node in generator.nodes() {
            graph.add_node(node);
        }
        for _ in 0..60 {
            graph.add_edge(generator.edge()).unwrap();
        }

        for id in &generator.node_ids {
            let node_id = NodeId::from(id.as_str());
            let expected: BTreeSet<Arc<EvidenceRef>> = graph
                .edges()
                .iter()
                .filter(|edge| edge.touches(&node_id))
                .flat_map(|edge| edge.evidence().iter().cloned())
                .collect();
            assert_eq!(graph.trace(&node_id), expected, "seed {} node {}", seed, id);
        }
    }
}

#[test]
fn trace_collapses_shared_references() {
    let mut graph = clinical_graph();
    // Same lab record backs a second relationship
    graph
        .add_edge(Edge::new("obs/2", "obs/1", "derived_from", vec![dated(Source::Lab, "LAB-77", 3)]).unwrap())
        .unwrap();

    let trace = graph.trace(&"obs/2".into());
    let labs: Vec<_> = trace.iter().filter(|ev| ev.source() == Source::Lab).collect();
    assert_eq!(labs.len(), 1);
}

// ============================================================================
// Policy and queries
// ============================================================================

#[test]
fn self_loop_policy_is_enforced_per_kind() {
    let policy = GraphPolicy::new().forbid_self_loops("subject");
    let mut graph = AtlasGraph::with_policy(policy.clone());
    graph.add_node(Node::new("patient/1", "Patient").unwrap());

    // Built under the permissive default, caught by the graph
    let edge = Edge::new("patient/1", "patient/1", "subject", vec![evidence(Source::Fhir, "p")]).unwrap();
    assert!(matches!(
        graph.add_edge(edge),
        Err(IntegrityError::SelfLoopForbidden { .. })
    ));

    let same_as = Edge::create("patient/1", "patient/1", "same_as", vec![evidence(Source::Claims, "c")], &policy)
        .unwrap();
    graph.add_edge(same_as).unwrap();
    assert_eq!(graph.neighbors(&"patient/1".into(), Direction::Both, None).count(), 1);
}

#[test]
fn trace_query_filters_and_orders_newest_first() {
    let graph = clinical_graph();
    let trail = TraceQuery::new("patient/1").execute(&graph);

    let ids: Vec<&str> = trail.entries.iter().map(|e| e.evidence.id()).collect();
    assert_eq!(ids, vec!["LAB-77", "Observation/2", "Observation/1", "1.2.840.1"]);

    let fhir_only = TraceQuery::new("patient/1").with_source(Source::Fhir).execute(&graph);
    assert_eq!(fhir_only.len(), 2);
    assert!(fhir_only.evidence().all(|ev| ev.source() == Source::Fhir));
}

// ============================================================================
// Engine
// ============================================================================

#[test]
fn readers_keep_their_snapshot_while_writers_commit() {
    let engine = AtlasEngine::new();
    let id = GraphId::from("ward-7");
    engine.insert_graph(id.clone(), clinical_graph()).unwrap();

    let before = engine.snapshot(&id).unwrap();
    let edges_before = before.edge_count();

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let engine = &engine;
            let id = &id;
            scope.spawn(move || {
                for i in 0..25 {
                    let node = format!("obs/w{}-{}", worker, i);
                    engine.add_node(id, Node::new(node.as_str(), "Observation").unwrap()).unwrap();
                    let edge = Edge::new(
                        node.as_str(),
                        "patient/1",
                        "subject",
                        vec![evidence(Source::Device, &node)],
                    )
                    .unwrap();
                    engine.add_edge(id, edge).unwrap();
                }
            });
        }
    });

    assert_eq!(before.edge_count(), edges_before);
    let after = engine.snapshot(&id).unwrap();
    assert_eq!(after.edge_count(), edges_before + 100);
    assert_eq!(after.neighbors(&"patient/1".into(), Direction::Incoming, None).count(), 103);
}

#[test]
fn engine_rejects_bad_edges_without_side_effects() {
    let engine = AtlasEngine::new();
    let id = GraphId::from("ward-7");
    engine.insert_graph(id.clone(), clinical_graph()).unwrap();

    let edge = Edge::new("obs/99", "patient/1", "subject", vec![evidence(Source::Fhir, "x")]).unwrap();
    let err = engine.add_edge(&id, edge).unwrap_err();
    assert!(matches!(err, AtlasError::Integrity(IntegrityError::DanglingReference { .. })));
    assert_eq!(engine.snapshot(&id).unwrap().edge_count(), 4);

    let missing = engine.add_node(&GraphId::from("nope"), Node::new("a", "b").unwrap());
    assert!(matches!(missing, Err(AtlasError::GraphNotFound(_))));
}
