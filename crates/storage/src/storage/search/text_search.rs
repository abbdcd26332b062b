//! Text-based search functions (FTS5)

use ia_core::constants::MAX_QUERY_LIMIT;
use rusqlite::params;

use super::build_fts_query;
use crate::MessageHit;
use crate::StorageError;
use crate::storage::{Storage, get_conn, log_row_error};

impl Storage {
    /// Ranked full-text search over message content.
    ///
    /// Hits are ordered best first. `score` is the raw `bm25()` value, so
    /// smaller is better. A query with no usable words returns nothing.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn search_messages(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MessageHit>, StorageError> {
        let fts_query = build_fts_query(query);
        if fts_query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let limit = limit.min(MAX_QUERY_LIMIT);

        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT f.node_id, f.conversation_id, n.role,
                    snippet(fts_messages, 2, '[', ']', '...', 12),
                    bm25(fts_messages) AS score
               FROM fts_messages f
               LEFT JOIN nodes n ON n.id = f.node_id
               WHERE fts_messages MATCH ?1
               ORDER BY score
               LIMIT ?2",
        )?;
        let hits = stmt
            .query_map(params![fts_query, limit as i64], |row| {
                Ok(MessageHit {
                    node_id: row.get(0)?,
                    conversation_id: row.get(1)?,
                    role: row.get(2)?,
                    snippet: row.get(3)?,
                    score: row.get(4)?,
                })
            })?
            .filter_map(log_row_error)
            .collect();
        Ok(hits)
    }

    /// Node ids that have a search entry in one conversation, ordered by id.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn search_entry_ids(&self, conversation_id: &str) -> Result<Vec<String>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT node_id FROM fts_messages WHERE conversation_id = ?1 ORDER BY node_id",
        )?;
        let ids = stmt
            .query_map(params![conversation_id], |row| row.get(0))?
            .filter_map(log_row_error)
            .collect();
        Ok(ids)
    }
}
