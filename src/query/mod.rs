//! Query system for MedAtlas graphs
//!
//! Provides capabilities for finding nodes, traversing edges, tracing
//! provenance, and ranking relationships by the evidence behind them.

mod find;
mod rank;
mod trace;
mod traverse;
mod types;

pub use crate::graph::Direction;
pub use find::FindQuery;
pub use rank::{rank_edges, EvidenceWeight, RankedEdge};
pub use trace::TraceQuery;
pub use traverse::TraverseQuery;
pub use types::{EvidenceTrail, QueryResult, TraceEntry, TraversalResult};
