//! Storage trait definitions

use crate::graph::{AtlasGraph, Edge, GraphId, GraphPolicy, IntegrityError, Node};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored graph violates integrity: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for graph storage backends
///
/// Implementations must be thread-safe (Send + Sync) to support
/// concurrent access from multiple threads. A stored graph must come back
/// with every field intact, nodes keyed by id and edges plus their evidence
/// in their original order.
pub trait GraphStore: Send + Sync {
    // === Graph Operations ===

    /// Register an empty graph under `policy`.
    ///
    /// Returns `false`, leaving the stored graph untouched, if `id` exists.
    fn create_graph(&self, id: &GraphId, policy: &GraphPolicy) -> StorageResult<bool>;

    /// Replace the stored graph with `graph`
    fn save_graph(&self, id: &GraphId, graph: &AtlasGraph) -> StorageResult<()>;

    /// Load a graph by ID, replaying it through the integrity checks
    fn load_graph(&self, id: &GraphId) -> StorageResult<Option<AtlasGraph>>;

    /// Delete a graph and all its nodes/edges/evidence
    fn delete_graph(&self, id: &GraphId) -> StorageResult<bool>;

    /// List all graph IDs
    fn list_graphs(&self) -> StorageResult<Vec<GraphId>>;

    // === Incremental Operations ===

    /// Insert or update a node
    fn save_node(&self, graph_id: &GraphId, node: &Node) -> StorageResult<()>;

    /// Append an edge at `position` in the graph's edge sequence
    fn append_edge(&self, graph_id: &GraphId, position: usize, edge: &Edge) -> StorageResult<()>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: GraphStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
