use super::{Storage, get_conn};
use crate::{StorageError, StorageStats};

fn count(conn: &rusqlite::Connection, table: &str) -> Result<u64, StorageError> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(n as u64)
}

impl Storage {
    /// Get storage statistics.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_stats(&self) -> Result<StorageStats, StorageError> {
        let conn = get_conn(&self.pool)?;
        Ok(StorageStats {
            conversation_count: count(&conn, "conversations")?,
            node_count: count(&conn, "nodes")?,
            edge_count: count(&conn, "edges")?,
            search_entry_count: count(&conn, "fts_messages")?,
            ingest_run_count: count(&conn, "ingest_runs")?,
            state_count: count(&conn, "state")?,
        })
    }

    /// Compact the database file and rebuild the search index segments.
    ///
    /// # Errors
    /// Returns error if the database is in use by a writer or the disk is full.
    pub fn vacuum(&self) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.execute_batch(
            "INSERT INTO fts_messages(fts_messages) VALUES('optimize');
             VACUUM;",
        )?;
        tracing::info!("Database vacuumed");
        Ok(())
    }
}
