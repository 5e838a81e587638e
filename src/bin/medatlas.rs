//! MedAtlas CLI: inspect and load provenance graphs.
//!
//! Usage:
//!   medatlas import <snapshot.json> --graph <name> [--db path]
//!   medatlas trace --graph <name> --node <id> [--source lab]

use clap::{Parser, Subcommand};
use medatlas::{
    config, rank_edges, AtlasConfig, AtlasEngine, AtlasGraph, Direction, GraphId, GraphSnapshot,
    OpenStore, Source, SqliteStore, TraceQuery,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "medatlas",
    version,
    about = "Provenance-preserving clinical entity graph"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Path to YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a JSON snapshot as a graph
    Import {
        /// Snapshot file
        path: PathBuf,
        /// Graph name
        #[arg(long)]
        graph: String,
        /// Replace the graph if it already exists
        #[arg(long)]
        replace: bool,
    },
    /// Print a graph as a JSON snapshot
    Export {
        #[arg(long)]
        graph: String,
    },
    /// List all graphs
    List,
    /// Show node/edge counts and evidence sources for a graph
    Stats {
        #[arg(long)]
        graph: String,
    },
    /// Show the evidence behind every relationship of a node
    Trace {
        #[arg(long)]
        graph: String,
        #[arg(long)]
        node: String,
        /// Only evidence from this source (fhir, dicom, note, lab, device, claims, synthetic)
        #[arg(long)]
        source: Option<String>,
    },
    /// List edges touching a node, strongest evidence first
    Neighbors {
        #[arg(long)]
        graph: String,
        #[arg(long)]
        node: String,
        /// outgoing, incoming or both
        #[arg(long, default_value = "both")]
        direction: String,
        /// Only edges of this kind
        #[arg(long)]
        kind: Option<String>,
    },
}

fn init_logging(level: &str) -> Result<(), String> {
    let level = config::parse_level(level).map_err(|e| e.to_string())?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn open_engine(db_path: PathBuf) -> Result<AtlasEngine, String> {
    let store = SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))?;
    let engine = AtlasEngine::with_store(Arc::new(store));
    engine.load_all().map_err(|e| format!("Failed to load graphs: {}", e))?;
    Ok(engine)
}

fn graph_snapshot(engine: &AtlasEngine, name: &str) -> Result<Arc<AtlasGraph>, String> {
    engine
        .snapshot(&GraphId::from(name))
        .ok_or_else(|| format!("graph '{}' not found", name))
}

fn cmd_import(engine: &AtlasEngine, cfg: &AtlasConfig, path: &Path, name: &str, replace: bool) -> Result<(), String> {
    let id = GraphId::from(name);
    if engine.has_graph(&id) && !replace {
        return Err(format!("graph '{}' already exists (use --replace)", name));
    }
    let json = std::fs::read_to_string(path).map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    // Snapshots without their own policy take the configured one
    let snapshot = GraphSnapshot::from_json(&json, &cfg.policy).map_err(|e| e.to_string())?;
    let graph = AtlasGraph::from_snapshot(snapshot).map_err(|e| e.to_string())?;
    let (nodes, edges) = (graph.node_count(), graph.edge_count());
    engine.insert_graph(id, graph).map_err(|e| e.to_string())?;
    println!("Imported '{}': {} nodes, {} edges", name, nodes, edges);
    Ok(())
}

fn cmd_list(engine: &AtlasEngine) -> Result<(), String> {
    let ids = engine.list_graphs();
    if ids.is_empty() {
        println!("No graphs defined.");
        return Ok(());
    }
    println!("{:<36}  {:>8}  {:>8}", "GRAPH", "NODES", "EDGES");
    println!("{}", "-".repeat(56));
    for id in ids {
        if let Some(graph) = engine.snapshot(&id) {
            println!("{:<36}  {:>8}  {:>8}", id, graph.node_count(), graph.edge_count());
        }
    }
    Ok(())
}

fn cmd_stats(engine: &AtlasEngine, name: &str) -> Result<(), String> {
    let graph = graph_snapshot(engine, name)?;
    println!("graph: {}", name);
    println!("nodes: {}", graph.node_count());
    println!("edges: {}", graph.edge_count());
    for source in Source::ALL {
        let count = graph.filter_by_source(source).count();
        if count > 0 {
            println!("  {:<10} {:>8} edges", source, count);
        }
    }
    Ok(())
}

fn cmd_trace(engine: &AtlasEngine, name: &str, node: &str, source: Option<&str>) -> Result<(), String> {
    let graph = graph_snapshot(engine, name)?;
    let mut query = TraceQuery::new(node);
    if let Some(source) = source {
        query = query.with_source(source.parse::<Source>().map_err(|e| e.to_string())?);
    }
    let trail = query.execute(&graph);
    if trail.is_empty() {
        println!("No evidence for '{}'.", node);
        return Ok(());
    }
    for entry in &trail.entries {
        let ev = &entry.evidence;
        let captured = ev
            .captured()
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<40}  {:<25}  {} edge(s)", ev.to_string(), captured, entry.edges.len());
        if let Some(uri) = ev.uri() {
            println!("    {}", uri);
        }
    }
    Ok(())
}

fn cmd_neighbors(
    engine: &AtlasEngine,
    name: &str,
    node: &str,
    direction: &str,
    kind: Option<&str>,
) -> Result<(), String> {
    let graph = graph_snapshot(engine, name)?;
    let direction: Direction = direction.parse()?;
    let node_id = node.into();
    for ranked in rank_edges(graph.neighbors(&node_id, direction, kind)) {
        let edge = ranked.edge;
        println!(
            "{} -[{}]-> {}  corroboration={:.2} evidence={}",
            edge.src(),
            edge.kind(),
            edge.dst(),
            ranked.weight.corroboration,
            ranked.weight.references
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), String> {
    let cfg = match &cli.config {
        Some(path) => AtlasConfig::load(path).map_err(|e| e.to_string())?,
        None => AtlasConfig::default(),
    };
    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.log_level.clone())
        .unwrap_or_else(|| "warn".to_string());
    init_logging(&level)?;

    let db_path = cli.db.clone().unwrap_or_else(|| cfg.db_path());
    let engine = open_engine(db_path)?;

    match cli.command {
        Commands::Import { path, graph, replace } => cmd_import(&engine, &cfg, &path, &graph, replace),
        Commands::Export { graph } => {
            let json = engine
                .export_json(&GraphId::from(graph.as_str()))
                .map_err(|e| e.to_string())?;
            println!("{}", json);
            Ok(())
        }
        Commands::List => cmd_list(&engine),
        Commands::Stats { graph } => cmd_stats(&engine, &graph),
        Commands::Trace { graph, node, source } => cmd_trace(&engine, &graph, &node, source.as_deref()),
        Commands::Neighbors { graph, node, direction, kind } => {
            cmd_neighbors(&engine, &graph, &node, &direction, kind.as_deref())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
