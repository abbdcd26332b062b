use ia_core::{ConversationRow, FlatTree};
use rusqlite::{Connection, OptionalExtension as _, params};

use super::nodes::insert_tree;
use super::{Storage, get_conn, log_row_error};
use crate::{StorageError, WriteMode};

const SELECT_CONVERSATION: &str =
    "SELECT id, title, create_time, update_time, current_node, fingerprint FROM conversations";

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConversationRow> {
    Ok(ConversationRow {
        id: row.get(0)?,
        title: row.get(1)?,
        create_time: row.get(2)?,
        update_time: row.get(3)?,
        current_node: row.get(4)?,
        fingerprint: row.get(5)?,
    })
}

pub(crate) fn upsert_conversation_row(
    conn: &Connection,
    row: &ConversationRow,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO conversations (id, title, create_time, update_time, current_node, fingerprint)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT(id) DO UPDATE SET
               title = excluded.title,
               create_time = excluded.create_time,
               update_time = excluded.update_time,
               current_node = excluded.current_node,
               fingerprint = excluded.fingerprint",
        params![
            row.id,
            row.title,
            row.create_time,
            row.update_time,
            row.current_node,
            row.fingerprint,
        ],
    )?;
    Ok(())
}

/// Removes edges, search entries, nodes and the conversation row, in
/// foreign-key order. Returns whether a conversation row existed.
pub(crate) fn delete_conversation_rows(
    conn: &Connection,
    conversation_id: &str,
) -> Result<bool, StorageError> {
    conn.execute("DELETE FROM edges WHERE conversation_id = ?1", params![conversation_id])?;
    conn.execute(
        "DELETE FROM fts_messages WHERE conversation_id = ?1",
        params![conversation_id],
    )?;
    conn.execute("DELETE FROM nodes WHERE conversation_id = ?1", params![conversation_id])?;
    let removed =
        conn.execute("DELETE FROM conversations WHERE id = ?1", params![conversation_id])?;
    Ok(removed > 0)
}

impl Storage {
    /// Insert or update a conversation row keyed by id.
    ///
    /// # Errors
    /// Returns error if database write fails.
    pub fn upsert_conversation(&self, row: &ConversationRow) -> Result<(), StorageError> {
        self.with_write_tx(|tx| upsert_conversation_row(tx, row))
    }

    /// Delete a conversation together with its nodes, edges and search entries.
    ///
    /// Ingestion never calls this on its own; it goes through
    /// [`Storage::write_conversation`] so that the rewrite is atomic.
    ///
    /// # Errors
    /// Returns error if database write fails.
    pub fn delete_conversation(&self, conversation_id: &str) -> Result<bool, StorageError> {
        self.with_write_tx(|tx| delete_conversation_rows(tx, conversation_id))
    }

    /// Persist one conversation as a single unit of work: optionally drop the
    /// previous rows, upsert the conversation, then insert nodes, edges and
    /// search entries. Either all of it commits or none of it does.
    ///
    /// # Errors
    /// Returns error if any statement fails; the transaction is rolled back.
    pub fn write_conversation(
        &self,
        row: &ConversationRow,
        tree: &FlatTree,
        mode: WriteMode,
    ) -> Result<(), StorageError> {
        self.with_write_tx(|tx| {
            if mode == WriteMode::Replace {
                delete_conversation_rows(tx, &row.id)?;
            }
            upsert_conversation_row(tx, row)?;
            insert_tree(tx, &row.id, tree)
        })
    }

    /// Fingerprint stored for a conversation, if it was ingested before.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_fingerprint(&self, conversation_id: &str) -> Result<Option<String>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let fingerprint = conn
            .query_row(
                "SELECT fingerprint FROM conversations WHERE id = ?1",
                params![conversation_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(fingerprint)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn get_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Option<ConversationRow>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let row = conn
            .query_row(
                &format!("{SELECT_CONVERSATION} WHERE id = ?1"),
                params![conversation_id],
                row_to_conversation,
            )
            .optional()?;
        Ok(row)
    }

    /// All conversations, ordered by id.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_conversations(&self) -> Result<Vec<ConversationRow>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!("{SELECT_CONVERSATION} ORDER BY id"))?;
        let rows = stmt.query_map([], row_to_conversation)?.filter_map(log_row_error).collect();
        Ok(rows)
    }
}
