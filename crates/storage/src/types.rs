//! Storage types shared across modules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How `write_conversation` treats rows already stored for the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// First ingest: nothing to remove.
    Insert,
    /// Fingerprint changed: drop every existing row before inserting.
    Replace,
}

/// Audit record of one ingest invocation, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIngestRun {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input_path: String,
    pub added: u64,
    pub updated: u64,
    pub skipped: u64,
}

/// Stored audit record of one ingest invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestRun {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input_path: String,
    pub added: u64,
    pub updated: u64,
    pub skipped: u64,
}

/// One full-text search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageHit {
    pub node_id: String,
    pub conversation_id: String,
    pub role: Option<String>,
    pub snippet: String,
    /// BM25 rank; lower is better.
    pub score: f64,
}

/// Row counts of every table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    pub conversation_count: u64,
    pub node_count: u64,
    pub edge_count: u64,
    pub search_entry_count: u64,
    pub ingest_run_count: u64,
    pub state_count: u64,
}
