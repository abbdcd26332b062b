//! Schema for conversations, nodes, edges, the FTS5 message index, ingest
//! runs and key/value state. Creation is idempotent.

use rusqlite::Connection;

pub(crate) const SCHEMA_VERSION: i32 = 1;

const SQL: &str = "
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    title TEXT,
    create_time REAL,
    update_time REAL,
    current_node TEXT,
    fingerprint TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS nodes (
    id TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL REFERENCES conversations(id),
    parent_id TEXT,
    role TEXT,
    content TEXT NOT NULL DEFAULT '',
    create_time REAL
);

CREATE TABLE IF NOT EXISTS edges (
    conversation_id TEXT NOT NULL REFERENCES conversations(id),
    parent_id TEXT NOT NULL REFERENCES nodes(id),
    child_id TEXT NOT NULL REFERENCES nodes(id),
    PRIMARY KEY (conversation_id, parent_id, child_id)
);

CREATE VIRTUAL TABLE IF NOT EXISTS fts_messages USING fts5(
    node_id UNINDEXED,
    conversation_id UNINDEXED,
    content,
    tokenize = 'porter'
);

CREATE TABLE IF NOT EXISTS ingest_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    input_path TEXT NOT NULL,
    added_conversations INTEGER NOT NULL,
    updated_conversations INTEGER NOT NULL,
    skipped_conversations INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_nodes_conversation ON nodes(conversation_id);
CREATE INDEX IF NOT EXISTS idx_edges_parent ON edges(parent_id);
CREATE INDEX IF NOT EXISTS idx_edges_child ON edges(child_id);
";

/// Creates every table and index that does not exist yet, in one transaction.
pub(crate) fn initialize(conn: &Connection) -> Result<(), rusqlite::Error> {
    let current_version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(SQL)?;
    if current_version < SCHEMA_VERSION {
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    tx.commit()?;

    tracing::info!(
        previous_version = current_version,
        version = SCHEMA_VERSION,
        "Database schema ready"
    );
    Ok(())
}
