//! AtlasEngine: shared, snapshot-isolated access to named graphs

use super::atlas::AtlasGraph;
use super::edge::Edge;
use super::error::{IntegrityError, ValidationError};
use super::node::{Node, NodeId, Properties};
use super::policy::GraphPolicy;
use crate::storage::{GraphStore, StorageError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Unique identifier for a graph
///
/// Serializes as a plain string (UUID or semantic ID like "ward-7")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphId(String);

impl GraphId {
    /// Create a new random GraphId (UUID-based)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GraphId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GraphId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Errors that can occur in MedAtlas operations
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Graph not found: {0}")]
    GraphNotFound(GraphId),

    #[error("Graph already exists: {0}")]
    GraphExists(GraphId),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Integrity violation: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for MedAtlas operations
pub type AtlasResult<T> = Result<T, AtlasError>;

/// The main MedAtlas engine
///
/// Holds each graph behind an `Arc`. Readers take a snapshot with
/// [`AtlasEngine::snapshot`] and keep a consistent view for as long as they
/// hold it. Writers for one graph are serialized by the map's per-entry lock
/// and copy the graph on write when a snapshot is still outstanding, so a
/// published snapshot never changes.
///
/// With a store attached, every mutation is written through before it is
/// applied in memory; a storage failure leaves the in-memory graph untouched.
#[derive(Default)]
pub struct AtlasEngine {
    graphs: DashMap<GraphId, Arc<AtlasGraph>>,
    store: Option<Arc<dyn GraphStore>>,
}

impl std::fmt::Debug for AtlasEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtlasEngine")
            .field("graphs", &self.graphs.len())
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl AtlasEngine {
    /// Create an in-memory engine
    pub fn new() -> Self {
        Self {
            graphs: DashMap::new(),
            store: None,
        }
    }

    /// Create an engine that writes through to `store`
    pub fn with_store(store: Arc<dyn GraphStore>) -> Self {
        Self {
            graphs: DashMap::new(),
            store: Some(store),
        }
    }

    /// Load every stored graph into memory, replacing any cached copy.
    ///
    /// Returns the number of graphs loaded. No-op without a store.
    pub fn load_all(&self) -> AtlasResult<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };
        let mut loaded = 0;
        for id in store.list_graphs()? {
            if let Some(graph) = store.load_graph(&id)? {
                self.graphs.insert(id, Arc::new(graph));
                loaded += 1;
            }
        }
        info!(graphs = loaded, "graphs loaded from store");
        Ok(loaded)
    }

    /// Create an empty graph.
    ///
    /// Fails with `GraphExists` if the id is cached or already stored,
    /// whether or not `load_all` has run. The id stays reserved in the map
    /// while the store is consulted.
    pub fn create_graph(&self, id: GraphId, policy: GraphPolicy) -> AtlasResult<()> {
        let entry = match self.graphs.entry(id) {
            Entry::Occupied(occupied) => return Err(AtlasError::GraphExists(occupied.key().clone())),
            Entry::Vacant(vacant) => vacant,
        };
        if let Some(store) = &self.store {
            if !store.create_graph(entry.key(), &policy)? {
                return Err(AtlasError::GraphExists(entry.key().clone()));
            }
        }
        info!(graph = %entry.key(), "graph created");
        entry.insert(Arc::new(AtlasGraph::with_policy(policy)));
        Ok(())
    }

    /// Create or replace a graph wholesale (import, rebuild)
    pub fn insert_graph(&self, id: GraphId, graph: AtlasGraph) -> AtlasResult<()> {
        if let Some(store) = &self.store {
            store.save_graph(&id, &graph)?;
        }
        info!(graph = %id, nodes = graph.node_count(), edges = graph.edge_count(), "graph installed");
        self.graphs.insert(id, Arc::new(graph));
        Ok(())
    }

    /// Current snapshot of a graph
    pub fn snapshot(&self, id: &GraphId) -> Option<Arc<AtlasGraph>> {
        self.graphs.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Remove a graph from memory and from the store
    pub fn remove_graph(&self, id: &GraphId) -> AtlasResult<bool> {
        let stored = match &self.store {
            Some(store) => store.delete_graph(id)?,
            None => false,
        };
        let cached = self.graphs.remove(id).is_some();
        Ok(stored || cached)
    }

    /// List all graph IDs
    pub fn list_graphs(&self) -> Vec<GraphId> {
        let mut ids: Vec<GraphId> = self.graphs.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Get the number of graphs
    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    /// Check if a graph exists
    pub fn has_graph(&self, id: &GraphId) -> bool {
        self.graphs.contains_key(id)
    }

    /// Insert a node into a graph; `false` if the id was already present
    pub fn add_node(&self, id: &GraphId, node: Node) -> AtlasResult<bool> {
        let mut entry = self
            .graphs
            .get_mut(id)
            .ok_or_else(|| AtlasError::GraphNotFound(id.clone()))?;

        if entry.contains_node(node.id()) {
            debug!(graph = %id, node = %node.id(), "node already present");
            return Ok(false);
        }
        if let Some(store) = &self.store {
            store.save_node(id, &node)?;
        }
        Ok(Arc::make_mut(entry.value_mut()).add_node(node))
    }

    /// Validate and append an edge to a graph
    pub fn add_edge(&self, id: &GraphId, edge: Edge) -> AtlasResult<()> {
        let mut entry = self
            .graphs
            .get_mut(id)
            .ok_or_else(|| AtlasError::GraphNotFound(id.clone()))?;

        entry.check_edge(&edge)?;
        if let Some(store) = &self.store {
            store.append_edge(id, entry.edge_count(), &edge)?;
        }
        Arc::make_mut(entry.value_mut()).add_edge(edge)?;
        Ok(())
    }

    /// Merge payload fields into a node of a graph
    pub fn update_payload(&self, id: &GraphId, node_id: &NodeId, merge: Properties) -> AtlasResult<()> {
        let mut entry = self
            .graphs
            .get_mut(id)
            .ok_or_else(|| AtlasError::GraphNotFound(id.clone()))?;

        let mut updated = entry
            .get_node(node_id)
            .cloned()
            .ok_or_else(|| IntegrityError::UnknownNode(node_id.clone()))?;
        updated.update_payload(merge.clone());
        if let Some(store) = &self.store {
            store.save_node(id, &updated)?;
        }
        Arc::make_mut(entry.value_mut()).update_payload(node_id, merge)?;
        Ok(())
    }

    /// Serialize a graph snapshot to pretty JSON
    pub fn export_json(&self, id: &GraphId) -> AtlasResult<String> {
        let graph = self
            .snapshot(id)
            .ok_or_else(|| AtlasError::GraphNotFound(id.clone()))?;
        Ok(serde_json::to_string_pretty(&graph.snapshot())?)
    }

    /// Replace a graph with one rebuilt from a JSON snapshot
    pub fn import_json(&self, id: GraphId, json: &str) -> AtlasResult<()> {
        let snapshot = serde_json::from_str(json)?;
        let graph = AtlasGraph::from_snapshot(snapshot)?;
        self.insert_graph(id, graph)
    }
}
