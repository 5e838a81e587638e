//! Evidence-weighted ranking of relationships

use crate::graph::Edge;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Corroboration gained per distinct source kind
const CORROBORATION_PER_SOURCE: f32 = 0.25;

/// How well an edge is substantiated by its evidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvidenceWeight {
    /// Distinct source kinds * 0.25, capped at 1.0
    pub corroboration: f32,
    /// Number of evidence references
    pub references: usize,
    /// Most recent capture time, if any evidence is dated
    pub latest: Option<DateTime<Utc>>,
}

impl EvidenceWeight {
    pub fn of(edge: &Edge) -> Self {
        let distinct = edge.sources().len() as f32;
        Self {
            corroboration: (distinct * CORROBORATION_PER_SOURCE).min(1.0),
            references: edge.evidence().len(),
            latest: edge.latest_capture(),
        }
    }

    /// Stronger first: more corroboration, then more recent, then more references
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .corroboration
            .total_cmp(&self.corroboration)
            .then_with(|| match (self.latest, other.latest) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| other.references.cmp(&self.references))
    }
}

/// An edge paired with its weight
#[derive(Debug, Clone)]
pub struct RankedEdge<'a> {
    pub edge: &'a Edge,
    pub weight: EvidenceWeight,
}

/// Order edges strongest-substantiated first.
///
/// The sort is stable, so equally weighted edges keep their input order.
pub fn rank_edges<'a>(edges: impl IntoIterator<Item = &'a Edge>) -> Vec<RankedEdge<'a>> {
    let mut ranked: Vec<RankedEdge<'a>> = edges
        .into_iter()
        .map(|edge| RankedEdge {
            edge,
            weight: EvidenceWeight::of(edge),
        })
        .collect();
    ranked.sort_by(|a, b| a.weight.rank_cmp(&b.weight));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AtlasGraph, Direction, EvidenceRef, Node, Source};
    use chrono::TimeZone;

    fn ev(source: Source, id: &str) -> EvidenceRef {
        EvidenceRef::new(source, id).unwrap()
    }

    #[test]
    fn test_corroboration_counts_distinct_sources() {
        let edge = Edge::new(
            "obs/1",
            "patient/1",
            "subject",
            vec![ev(Source::Fhir, "a"), ev(Source::Fhir, "b"), ev(Source::Lab, "c")],
        )
        .unwrap();
        let weight = EvidenceWeight::of(&edge);
        assert_eq!(weight.corroboration, 0.5);
        assert_eq!(weight.references, 3);
        assert!(weight.latest.is_none());
    }

    #[test]
    fn test_corroboration_is_capped() {
        let evidence: Vec<_> = Source::ALL.iter().map(|s| ev(*s, "x")).collect();
        let edge = Edge::new("a", "b", "same_as", evidence).unwrap();
        assert_eq!(EvidenceWeight::of(&edge).corroboration, 1.0);
    }

    #[test]
    fn test_rank_neighbors() {
        let mut graph = AtlasGraph::new();
        for id in ["patient/1", "obs/1", "obs/2", "obs/3"] {
            graph.add_node(Node::new(id, "x").unwrap());
        }
        let recent = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap();

        // single source, undated
        graph
            .add_edge(Edge::new("obs/1", "patient/1", "subject", vec![ev(Source::Synthetic, "s1")]).unwrap())
            .unwrap();
        // two sources
        graph
            .add_edge(
                Edge::new("obs/2", "patient/1", "subject", vec![ev(Source::Fhir, "o2"), ev(Source::Lab, "l2")])
                    .unwrap(),
            )
            .unwrap();
        // single source, dated
        graph
            .add_edge(
                Edge::new("obs/3", "patient/1", "subject", vec![ev(Source::Fhir, "o3").captured_at(recent)])
                    .unwrap(),
            )
            .unwrap();

        let ranked = rank_edges(graph.neighbors(&"patient/1".into(), Direction::Incoming, None));
        let order: Vec<_> = ranked.iter().map(|r| r.edge.src().as_str()).collect();
        assert_eq!(order, vec!["obs/2", "obs/3", "obs/1"]);
    }
}
