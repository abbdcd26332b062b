//! Storage layer for the conversation archive
//!
//! SQLite-based storage with FTS5 for full-text search over message content.
//! Every conversation is written in a single transaction, so a reader never
//! sees half of one.

mod error;
mod schema;
mod storage;
#[cfg(test)]
mod tests;
mod types;

pub use error::StorageError;
pub use storage::Storage;
pub use types::{IngestRun, MessageHit, NewIngestRun, StorageStats, WriteMode};
