//! Storage backends for MedAtlas graphs
//!
//! Graphs persist through the `GraphStore` trait. `SqliteStore` is the
//! bundled implementation; other backends plug in behind the same trait.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{GraphStore, OpenStore, StorageError, StorageResult};
