use ia_core::FlatTree;

use super::{create_test_node, create_test_row, create_test_storage};
use crate::WriteMode;

fn seed(storage: &crate::Storage) {
    let mut tree = FlatTree::default();
    tree.nodes.push(create_test_node("c1", "n1", None, "How do I plan a trip to Lisbon?"));
    tree.nodes.push(create_test_node("c1", "n2", Some("n1"), "Planning trips takes time."));
    tree.nodes.push(create_test_node("c1", "n3", Some("n2"), "Unrelated gardening notes"));
    storage.write_conversation(&create_test_row("c1", "fp1"), &tree, WriteMode::Insert).unwrap();
}

#[test]
fn test_search_messages_matches_stemmed_words() {
    let (storage, _temp_dir) = create_test_storage();
    seed(&storage);

    let hits = storage.search_messages("plan", 10).unwrap();
    let mut ids: Vec<_> = hits.iter().map(|h| h.node_id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["n1", "n2"]);
    assert!(hits.iter().all(|h| h.conversation_id == "c1"));
    assert!(hits.iter().all(|h| h.role.as_deref() == Some("user")));
}

#[test]
fn test_search_messages_requires_all_words() {
    let (storage, _temp_dir) = create_test_storage();
    seed(&storage);

    let hits = storage.search_messages("trip lisbon", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].node_id, "n1");
    assert!(hits[0].snippet.contains('['));
}

#[test]
fn test_search_messages_limit_and_empty_query() {
    let (storage, _temp_dir) = create_test_storage();
    seed(&storage);

    assert_eq!(storage.search_messages("plan", 1).unwrap().len(), 1);
    assert!(storage.search_messages("   ", 10).unwrap().is_empty());
    assert!(storage.search_messages("plan", 0).unwrap().is_empty());
    assert!(storage.search_messages("zebra", 10).unwrap().is_empty());
}

#[test]
fn test_search_follows_replacement() {
    let (storage, _temp_dir) = create_test_storage();
    seed(&storage);

    let mut tree = FlatTree::default();
    tree.nodes.push(create_test_node("c1", "n9", None, "Only gardening now"));
    storage.write_conversation(&create_test_row("c1", "fp2"), &tree, WriteMode::Replace).unwrap();

    assert!(storage.search_messages("plan", 10).unwrap().is_empty());
    let hits = storage.search_messages("gardening", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].node_id, "n9");
}
