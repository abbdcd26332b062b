//! Test utilities and module declarations for storage tests.

use crate::Storage;
use ia_core::{ConversationRow, EdgeRecord, FlatTree, NodeRecord};
use tempfile::TempDir;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::new(&db_path).unwrap();
    (storage, temp_dir)
}

pub fn create_test_row(id: &str, fingerprint: &str) -> ConversationRow {
    ConversationRow {
        id: id.to_owned(),
        title: Some(format!("Conversation {id}")),
        create_time: Some(1_700_000_000.0),
        update_time: Some(1_700_000_100.0),
        current_node: None,
        fingerprint: fingerprint.to_owned(),
    }
}

pub fn create_test_node(
    conversation_id: &str,
    id: &str,
    parent: Option<&str>,
    content: &str,
) -> NodeRecord {
    NodeRecord {
        id: id.to_owned(),
        conversation_id: conversation_id.to_owned(),
        parent_id: parent.map(str::to_owned),
        role: Some("user".to_owned()),
        content: content.to_owned(),
        create_time: Some(1_700_000_050.0),
    }
}

/// A linear chain `ids[0] -> ids[1] -> ...`, every node carrying `"<id> text"`.
pub fn create_test_chain(conversation_id: &str, ids: &[&str]) -> FlatTree {
    let mut tree = FlatTree::default();
    for (i, id) in ids.iter().enumerate() {
        let parent = i.checked_sub(1).map(|p| ids[p]);
        tree.nodes.push(create_test_node(conversation_id, id, parent, &format!("{id} text")));
        if let Some(parent) = parent {
            tree.edges.push(EdgeRecord {
                conversation_id: conversation_id.to_owned(),
                parent_id: parent.to_owned(),
                child_id: (*id).to_owned(),
            });
        }
    }
    tree
}

mod connection_tests;
mod conversation_tests;
mod search_tests;
mod state_tests;
