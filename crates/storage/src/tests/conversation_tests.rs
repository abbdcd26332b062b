use super::{create_test_chain, create_test_node, create_test_row, create_test_storage};
use crate::{Storage, StorageError, WriteMode};

#[test]
fn test_storage_new_is_empty() {
    let (storage, _temp_dir) = create_test_storage();
    let stats = storage.get_stats().unwrap();
    assert_eq!(stats.conversation_count, 0);
    assert_eq!(stats.node_count, 0);
    assert_eq!(stats.search_entry_count, 0);
}

#[test]
fn test_reopen_keeps_data() {
    let (storage, temp_dir) = create_test_storage();
    storage.upsert_conversation(&create_test_row("c1", "fp1")).unwrap();
    drop(storage);

    let reopened = Storage::new(&temp_dir.path().join("test.db")).unwrap();
    assert_eq!(reopened.get_fingerprint("c1").unwrap().as_deref(), Some("fp1"));
}

#[test]
fn test_upsert_conversation_replaces_fields() {
    let (storage, _temp_dir) = create_test_storage();
    storage.upsert_conversation(&create_test_row("c1", "fp1")).unwrap();

    let mut row = create_test_row("c1", "fp2");
    row.title = Some("Renamed".to_owned());
    storage.upsert_conversation(&row).unwrap();

    let stored = storage.get_conversation("c1").unwrap().unwrap();
    assert_eq!(stored, row);
    assert_eq!(storage.get_stats().unwrap().conversation_count, 1);
}

#[test]
fn test_get_fingerprint_unknown() {
    let (storage, _temp_dir) = create_test_storage();
    assert!(storage.get_fingerprint("missing").unwrap().is_none());
    assert!(storage.get_conversation("missing").unwrap().is_none());
}

#[test]
fn test_write_conversation_insert() {
    let (storage, _temp_dir) = create_test_storage();
    let tree = create_test_chain("c1", &["n1", "n2", "n3"]);
    storage.write_conversation(&create_test_row("c1", "fp1"), &tree, WriteMode::Insert).unwrap();

    let stats = storage.get_stats().unwrap();
    assert_eq!(stats.conversation_count, 1);
    assert_eq!(stats.node_count, 3);
    assert_eq!(stats.edge_count, 2);
    assert_eq!(stats.search_entry_count, 3);
}

#[test]
fn test_write_conversation_replace_removes_stale_rows() {
    let (storage, _temp_dir) = create_test_storage();
    let before = create_test_chain("c1", &["n1", "n2", "n3", "n4"]);
    storage.write_conversation(&create_test_row("c1", "fp1"), &before, WriteMode::Insert).unwrap();

    let after = create_test_chain("c1", &["n1", "n5"]);
    storage.write_conversation(&create_test_row("c1", "fp2"), &after, WriteMode::Replace).unwrap();

    assert_eq!(storage.node_ids_for_conversation("c1").unwrap(), vec!["n1", "n5"]);
    assert_eq!(storage.search_entry_ids("c1").unwrap(), vec!["n1", "n5"]);
    let edges = storage.get_edges("c1").unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!((edges[0].parent_id.as_str(), edges[0].child_id.as_str()), ("n1", "n5"));
    assert_eq!(storage.get_fingerprint("c1").unwrap().as_deref(), Some("fp2"));
}

#[test]
fn test_write_conversation_rolls_back_on_constraint_failure() {
    let (storage, _temp_dir) = create_test_storage();
    let first = create_test_chain("c1", &["shared", "n2"]);
    storage.write_conversation(&create_test_row("c1", "fp1"), &first, WriteMode::Insert).unwrap();
    let stats_before = storage.get_stats().unwrap();

    // c2 tries to claim a node id owned by c1.
    let mut second = create_test_chain("c2", &["m1"]);
    second.nodes.push(create_test_node("c2", "shared", None, "stolen"));
    let err = storage
        .write_conversation(&create_test_row("c2", "fp-c2"), &second, WriteMode::Insert)
        .unwrap_err();
    assert!(err.is_constraint(), "unexpected error: {err:?}");
    assert!(matches!(
        &err,
        StorageError::NodeOwnedElsewhere { node_id, conversation_id, owner }
            if node_id == "shared" && conversation_id == "c2" && owner == "c1"
    ));
    let message = err.to_string();
    assert!(message.contains("shared") && message.contains("c2") && message.contains("c1"));

    assert!(storage.get_conversation("c2").unwrap().is_none());
    assert!(storage.get_node("m1").unwrap().is_none());
    assert_eq!(storage.get_stats().unwrap(), stats_before);
    assert_eq!(storage.get_node("shared").unwrap().unwrap().conversation_id, "c1");
}

#[test]
fn test_failed_replace_keeps_previous_version() {
    let (storage, _temp_dir) = create_test_storage();
    let owner = create_test_chain("c1", &["a1"]);
    storage.write_conversation(&create_test_row("c1", "fp1"), &owner, WriteMode::Insert).unwrap();
    let other = create_test_chain("c2", &["b1", "b2"]);
    storage.write_conversation(&create_test_row("c2", "fp1"), &other, WriteMode::Insert).unwrap();

    let bad = create_test_chain("c2", &["b1", "a1"]);
    assert!(storage.write_conversation(&create_test_row("c2", "fp2"), &bad, WriteMode::Replace).is_err());

    assert_eq!(storage.get_fingerprint("c2").unwrap().as_deref(), Some("fp1"));
    assert_eq!(storage.node_ids_for_conversation("c2").unwrap(), vec!["b1", "b2"]);
    assert_eq!(storage.search_entry_ids("c2").unwrap(), vec!["b1", "b2"]);
}

#[test]
fn test_delete_conversation() {
    let (storage, _temp_dir) = create_test_storage();
    let tree = create_test_chain("c1", &["n1", "n2"]);
    storage.write_conversation(&create_test_row("c1", "fp1"), &tree, WriteMode::Insert).unwrap();

    assert!(storage.delete_conversation("c1").unwrap());
    assert!(!storage.delete_conversation("c1").unwrap());
    let stats = storage.get_stats().unwrap();
    assert_eq!(stats.conversation_count, 0);
    assert_eq!(stats.node_count, 0);
    assert_eq!(stats.edge_count, 0);
    assert_eq!(stats.search_entry_count, 0);
}

#[test]
fn test_list_conversations_ordered_by_id() {
    let (storage, _temp_dir) = create_test_storage();
    for id in ["b", "c", "a"] {
        storage.upsert_conversation(&create_test_row(id, "fp")).unwrap();
    }
    let ids: Vec<_> = storage.list_conversations().unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn test_vacuum_keeps_rows() {
    let (storage, _temp_dir) = create_test_storage();
    let tree = create_test_chain("c1", &["n1"]);
    storage.write_conversation(&create_test_row("c1", "fp1"), &tree, WriteMode::Insert).unwrap();
    storage.vacuum().unwrap();
    assert_eq!(storage.get_stats().unwrap().node_count, 1);
}
