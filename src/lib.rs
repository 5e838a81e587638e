//! MedAtlas: Provenance-Preserving Clinical Entity Graph
//!
//! Unifies FHIR resources, imaging metadata, clinical notes, lab results,
//! device telemetry, claims and synthetic records into one graph in which
//! every relationship carries the evidence that justifies it.
//!
//! # Core Concepts
//!
//! - **EvidenceRef**: immutable pointer to a source record (kind, id, URI, capture time)
//! - **Node**: an entity with a fixed id and kind and an enrichable payload
//! - **Edge**: a typed relationship backed by at least one EvidenceRef
//! - **AtlasGraph**: the aggregate; rejects dangling or unsupported edges
//!
//! # Example
//!
//! ```
//! use medatlas::{AtlasGraph, Direction, Edge, EvidenceRef, Node, Source};
//!
//! let mut graph = AtlasGraph::new();
//! graph.add_node(Node::new("patient/1", "Patient").unwrap());
//! graph.add_node(Node::new("obs/1", "Observation").unwrap());
//!
//! let evidence = EvidenceRef::new(Source::Fhir, "Observation/1").unwrap();
//! let edge = Edge::new("obs/1", "patient/1", "subject", vec![evidence]).unwrap();
//! graph.add_edge(edge).unwrap();
//!
//! let patient = "patient/1".into();
//! assert_eq!(graph.neighbors(&patient, Direction::Incoming, None).count(), 1);
//! assert_eq!(graph.trace(&patient).len(), 1);
//! ```

pub mod config;
mod graph;
pub mod query;
pub mod storage;

pub use config::{AtlasConfig, ConfigError};
pub use graph::{
    AtlasEngine, AtlasError, AtlasGraph, AtlasResult, Direction, Edge, Endpoint, EvidenceRef,
    GraphId, GraphPolicy, GraphSnapshot, IdSet, IntegrityError, IntegrityIndex, Neighbors, Node,
    NodeId, Properties, PropertyValue, Source, ValidationError,
};
pub use query::{
    rank_edges, EvidenceTrail, EvidenceWeight, FindQuery, QueryResult, RankedEdge, TraceEntry,
    TraceQuery, TraversalResult, TraverseQuery,
};
pub use storage::{GraphStore, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
