//! SQLite storage backend for MedAtlas

use super::traits::{GraphStore, OpenStore, StorageError, StorageResult};
use crate::graph::{AtlasGraph, Edge, EvidenceRef, GraphId, GraphPolicy, GraphSnapshot, Node, Source};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// SQLite-backed graph store
///
/// Uses a single SQLite database file with tables for graphs, nodes, edges
/// and evidence. Edge insertion order is kept in `edges.seq` and evidentiary
/// order in `evidence.position`.
/// Thread-safe via internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// One stored evidence row: (edge seq, source, record id, uri, captured_at)
type EvidenceRow = (i64, String, String, Option<String>, Option<String>);

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- Enable WAL mode for concurrent reads during writes
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS graphs (
                id TEXT PRIMARY KEY,
                policy_json TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS nodes (
                graph_id TEXT NOT NULL,
                id TEXT NOT NULL,
                kind TEXT NOT NULL,
                payload_json TEXT NOT NULL,
                PRIMARY KEY (graph_id, id),
                FOREIGN KEY (graph_id) REFERENCES graphs(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_nodes_kind
                ON nodes(graph_id, kind);

            CREATE TABLE IF NOT EXISTS edges (
                graph_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                src TEXT NOT NULL,
                dst TEXT NOT NULL,
                kind TEXT NOT NULL,
                PRIMARY KEY (graph_id, seq),
                FOREIGN KEY (graph_id) REFERENCES graphs(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_edges_src
                ON edges(graph_id, src);
            CREATE INDEX IF NOT EXISTS idx_edges_dst
                ON edges(graph_id, dst);

            CREATE TABLE IF NOT EXISTS evidence (
                graph_id TEXT NOT NULL,
                edge_seq INTEGER NOT NULL,
                position INTEGER NOT NULL,
                source TEXT NOT NULL,
                record_id TEXT NOT NULL,
                uri TEXT,
                captured_at TEXT,
                PRIMARY KEY (graph_id, edge_seq, position),
                FOREIGN KEY (graph_id, edge_seq) REFERENCES edges(graph_id, seq) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_evidence_source
                ON evidence(graph_id, source);
            "#,
        )?;
        Ok(())
    }

    fn insert_node(tx: &Transaction<'_>, graph_id: &GraphId, node: &Node) -> StorageResult<()> {
        tx.execute(
            r#"
            INSERT INTO nodes (graph_id, id, kind, payload_json)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(graph_id, id) DO UPDATE SET
                payload_json = excluded.payload_json
            "#,
            params![
                graph_id.as_str(),
                node.id().as_str(),
                node.kind(),
                serde_json::to_string(node.payload())?,
            ],
        )?;
        Ok(())
    }

    fn insert_edge(tx: &Transaction<'_>, graph_id: &GraphId, position: usize, edge: &Edge) -> StorageResult<()> {
        let seq = position as i64;
        tx.execute(
            "INSERT INTO edges (graph_id, seq, src, dst, kind) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![graph_id.as_str(), seq, edge.src().as_str(), edge.dst().as_str(), edge.kind()],
        )?;
        for (i, evidence) in edge.evidence().iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO evidence (graph_id, edge_seq, position, source, record_id, uri, captured_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    graph_id.as_str(),
                    seq,
                    i as i64,
                    evidence.source().as_str(),
                    evidence.id(),
                    evidence.uri(),
                    evidence.captured().map(|at| at.to_rfc3339()),
                ],
            )?;
        }
        Ok(())
    }

    /// Rebuild an evidence reference from its row, reusing an existing
    /// allocation when an identical reference was already loaded
    fn row_to_evidence(
        source: String,
        record_id: String,
        uri: Option<String>,
        captured_at: Option<String>,
        interned: &mut HashMap<EvidenceRef, Arc<EvidenceRef>>,
    ) -> StorageResult<Arc<EvidenceRef>> {
        let source: Source = source
            .parse()
            .map_err(|e: crate::graph::ValidationError| StorageError::InvalidValue(e.to_string()))?;
        let mut evidence = EvidenceRef::new(source, record_id)
            .map_err(|e| StorageError::InvalidValue(e.to_string()))?;
        if let Some(uri) = uri {
            evidence = evidence.with_uri(uri);
        }
        if let Some(captured_at) = captured_at {
            let at = DateTime::parse_from_rfc3339(&captured_at)
                .map_err(|e| StorageError::DateParse(e.to_string()))?
                .with_timezone(&Utc);
            evidence = evidence.captured_at(at);
        }
        let shared = interned
            .entry(evidence.clone())
            .or_insert_with(|| Arc::new(evidence));
        Ok(shared.clone())
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl GraphStore for SqliteStore {
    // === Graph Operations ===

    fn create_graph(&self, id: &GraphId, policy: &GraphPolicy) -> StorageResult<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO graphs (id, policy_json) VALUES (?1, ?2)",
            params![id.as_str(), serde_json::to_string(policy)?],
        )?;
        if inserted == 1 {
            info!(graph = %id, "graph created");
        }
        Ok(inserted == 1)
    }

    fn save_graph(&self, id: &GraphId, graph: &AtlasGraph) -> StorageResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        // Replacing the graph row cascades to nodes, edges and evidence
        tx.execute("DELETE FROM graphs WHERE id = ?1", params![id.as_str()])?;
        tx.execute(
            "INSERT INTO graphs (id, policy_json) VALUES (?1, ?2)",
            params![id.as_str(), serde_json::to_string(graph.policy())?],
        )?;

        for node in graph.nodes() {
            Self::insert_node(&tx, id, node)?;
        }
        for (position, edge) in graph.edges().iter().enumerate() {
            Self::insert_edge(&tx, id, position, edge)?;
        }

        tx.commit()?;
        info!(graph = %id, nodes = graph.node_count(), edges = graph.edge_count(), "graph saved");
        Ok(())
    }

    fn load_graph(&self, id: &GraphId) -> StorageResult<Option<AtlasGraph>> {
        let conn = self.conn.lock().unwrap();

        let policy_json: Option<String> = conn
            .query_row(
                "SELECT policy_json FROM graphs WHERE id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(policy_json) = policy_json else {
            return Ok(None);
        };
        let policy: GraphPolicy = serde_json::from_str(&policy_json)?;

        // Load nodes
        let mut stmt = conn.prepare(
            "SELECT id, kind, payload_json FROM nodes WHERE graph_id = ?1 ORDER BY id",
        )?;
        let node_rows = stmt.query_map(params![id.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut nodes = Vec::new();
        for row in node_rows {
            let (node_id, kind, payload_json) = row?;
            let node = Node::create(node_id, kind, serde_json::from_str(&payload_json)?)
                .map_err(|e| StorageError::InvalidValue(e.to_string()))?;
            nodes.push(node);
        }

        // Load evidence, grouped by edge
        let mut stmt = conn.prepare(
            "SELECT edge_seq, source, record_id, uri, captured_at
             FROM evidence WHERE graph_id = ?1 ORDER BY edge_seq, position",
        )?;
        let evidence_rows = stmt.query_map(params![id.as_str()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut interned: HashMap<EvidenceRef, Arc<EvidenceRef>> = HashMap::new();
        let mut evidence_by_edge: BTreeMap<i64, Vec<Arc<EvidenceRef>>> = BTreeMap::new();
        for row in evidence_rows {
            let (seq, source, record_id, uri, captured_at): EvidenceRow = row?;
            let evidence = Self::row_to_evidence(source, record_id, uri, captured_at, &mut interned)?;
            evidence_by_edge.entry(seq).or_default().push(evidence);
        }

        // Load edges
        let mut stmt = conn.prepare(
            "SELECT seq, src, dst, kind FROM edges WHERE graph_id = ?1 ORDER BY seq",
        )?;
        let edge_rows = stmt.query_map(params![id.as_str()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut edges = Vec::new();
        for row in edge_rows {
            let (seq, src, dst, kind) = row?;
            let evidence = evidence_by_edge.remove(&seq).unwrap_or_default();
            // The stored policy is applied when the snapshot is replayed below
            let edge = Edge::create(src, dst, kind, evidence, &GraphPolicy::default())
                .map_err(|e| StorageError::InvalidValue(e.to_string()))?;
            edges.push(edge);
        }

        let graph = AtlasGraph::from_snapshot(GraphSnapshot { policy, nodes, edges })?;
        debug!(graph = %id, nodes = graph.node_count(), edges = graph.edge_count(), "graph loaded");
        Ok(Some(graph))
    }

    fn delete_graph(&self, id: &GraphId) -> StorageResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM graphs WHERE id = ?1", params![id.as_str()])?;
        Ok(rows > 0)
    }

    fn list_graphs(&self) -> StorageResult<Vec<GraphId>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id FROM graphs ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|r| r.map(GraphId::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    // === Incremental Operations ===

    fn save_node(&self, graph_id: &GraphId, node: &Node) -> StorageResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        Self::insert_node(&tx, graph_id, node)?;
        tx.commit()?;
        Ok(())
    }

    fn append_edge(&self, graph_id: &GraphId, position: usize, edge: &Edge) -> StorageResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        Self::insert_edge(&tx, graph_id, position, edge)?;
        tx.commit()?;
        Ok(())
    }
}
