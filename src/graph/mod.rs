//! Core graph data structures

mod adjacency;
mod atlas;
mod edge;
mod engine;
mod error;
mod evidence;
mod integrity;
mod node;
mod policy;


pub use adjacency::{Direction, Neighbors};
pub use atlas::{AtlasGraph, GraphSnapshot};
pub use edge::Edge;
pub use engine::{AtlasEngine, AtlasError, AtlasResult, GraphId};
pub use error::{Endpoint, IntegrityError, ValidationError};
pub use evidence::{EvidenceRef, Source};
pub use integrity::{IdSet, IntegrityIndex};
pub use node::{Node, NodeId, Properties, PropertyValue};
pub use policy::GraphPolicy;
