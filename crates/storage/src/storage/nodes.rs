use ia_core::{EdgeRecord, FlatTree, NodeRecord};
use rusqlite::{Connection, OptionalExtension as _, params};

use super::{Storage, get_conn, log_row_error};
use crate::StorageError;

const SELECT_NODE: &str =
    "SELECT id, conversation_id, parent_id, role, content, create_time FROM nodes";

fn row_to_node(row: &rusqlite::Row<'_>) -> rusqlite::Result<NodeRecord> {
    Ok(NodeRecord {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        parent_id: row.get(2)?,
        role: row.get(3)?,
        content: row.get(4)?,
        create_time: row.get(5)?,
    })
}

/// Names the owning conversation when a node insert hits an id that another
/// conversation already holds. Other failures pass through unchanged.
fn node_insert_error(
    conn: &Connection,
    conversation_id: &str,
    node_id: &str,
    err: rusqlite::Error,
) -> StorageError {
    let err = StorageError::from(err);
    if !err.is_constraint() {
        return err;
    }
    let owner: Option<String> = match conn
        .query_row("SELECT conversation_id FROM nodes WHERE id = ?1", params![node_id], |row| {
            row.get(0)
        })
        .optional()
    {
        Ok(owner) => owner,
        Err(lookup) => {
            tracing::warn!(node_id, error = %lookup, "Owner lookup failed after constraint error");
            None
        },
    };
    match owner {
        Some(owner) if owner != conversation_id => {
            tracing::warn!(node_id, conversation_id, owner = %owner, "Node id already owned");
            StorageError::NodeOwnedElsewhere {
                node_id: node_id.to_owned(),
                conversation_id: conversation_id.to_owned(),
                owner,
            }
        },
        _ => err,
    }
}

/// Inserts nodes, one search entry per node with content, then edges.
///
/// Nodes use a plain `INSERT`: a node id already owned by another
/// conversation is a constraint violation, not something to overwrite.
/// Duplicate edges collapse onto the composite primary key.
pub(crate) fn insert_tree(
    conn: &Connection,
    conversation_id: &str,
    tree: &FlatTree,
) -> Result<(), StorageError> {
    let mut node_stmt = conn.prepare_cached(
        "INSERT INTO nodes (id, conversation_id, parent_id, role, content, create_time)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let mut search_stmt = conn.prepare_cached(
        "INSERT INTO fts_messages (node_id, conversation_id, content) VALUES (?1, ?2, ?3)",
    )?;
    for node in &tree.nodes {
        let inserted = node_stmt.execute(params![
            node.id,
            conversation_id,
            node.parent_id,
            node.role,
            node.content,
            node.create_time,
        ]);
        if let Err(e) = inserted {
            return Err(node_insert_error(conn, conversation_id, &node.id, e));
        }
        if node.is_searchable() {
            search_stmt.execute(params![node.id, conversation_id, node.content])?;
        }
    }

    let mut edge_stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO edges (conversation_id, parent_id, child_id) VALUES (?1, ?2, ?3)",
    )?;
    for edge in &tree.edges {
        edge_stmt.execute(params![conversation_id, edge.parent_id, edge.child_id])?;
    }

    tracing::debug!(
        conversation_id,
        nodes = tree.nodes.len(),
        edges = tree.edges.len(),
        "Inserted conversation rows"
    );
    Ok(())
}

impl Storage {
    /// Insert a conversation's nodes and edges, plus a search entry for every
    /// node with non-empty content, as one batch.
    ///
    /// The conversation row must already exist.
    ///
    /// # Errors
    /// Returns error if any insert fails; nothing from the batch is kept.
    pub fn bulk_insert_nodes(
        &self,
        conversation_id: &str,
        tree: &FlatTree,
    ) -> Result<(), StorageError> {
        self.with_write_tx(|tx| insert_tree(tx, conversation_id, tree))
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn get_node(&self, node_id: &str) -> Result<Option<NodeRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let node = conn
            .query_row(&format!("{SELECT_NODE} WHERE id = ?1"), params![node_id], row_to_node)
            .optional()?;
        Ok(node)
    }

    /// Nodes of one conversation, ordered by id.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_nodes(&self, conversation_id: &str) -> Result<Vec<NodeRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt =
            conn.prepare(&format!("{SELECT_NODE} WHERE conversation_id = ?1 ORDER BY id"))?;
        let nodes = stmt
            .query_map(params![conversation_id], row_to_node)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(nodes)
    }

    /// Node ids of one conversation, ordered by id.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn node_ids_for_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<String>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt =
            conn.prepare("SELECT id FROM nodes WHERE conversation_id = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map(params![conversation_id], |row| row.get(0))?
            .filter_map(log_row_error)
            .collect();
        Ok(ids)
    }

    /// Edges of one conversation, ordered by parent then child.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_edges(&self, conversation_id: &str) -> Result<Vec<EdgeRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT conversation_id, parent_id, child_id FROM edges
               WHERE conversation_id = ?1
               ORDER BY parent_id, child_id",
        )?;
        let edges = stmt
            .query_map(params![conversation_id], |row| {
                Ok(EdgeRecord {
                    conversation_id: row.get(0)?,
                    parent_id: row.get(1)?,
                    child_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }
}
