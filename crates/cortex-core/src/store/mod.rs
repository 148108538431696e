//! Durable persistence, full-text keyword search, and the vector index facade.

mod keyword;
mod migrations;
mod sqlite;
pub mod vector;

pub use keyword::sanitize_fts5_query;
pub use sqlite::{ListFilter, MemoryPatch, Store, StoreStats};
