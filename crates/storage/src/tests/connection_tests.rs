use std::time::Duration;

use ia_core::config::StoreConfig;
use tempfile::TempDir;

use super::{create_test_chain, create_test_row, create_test_storage};
use crate::storage::get_conn;
use crate::{Storage, StorageError, WriteMode};

#[test]
fn test_connections_use_wal_and_foreign_keys() {
    let (storage, _temp_dir) = create_test_storage();
    let conn = get_conn(&storage.pool).unwrap();

    let mode: String = conn.pragma_query_value(None, "journal_mode", |row| row.get(0)).unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
    let foreign_keys: i64 = conn.pragma_query_value(None, "foreign_keys", |row| row.get(0)).unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn test_held_write_lock_surfaces_as_busy() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("locked.db");
    let config = StoreConfig { busy_timeout: Duration::from_millis(10), ..StoreConfig::default() };
    let storage = Storage::with_config(&db_path, config).unwrap();

    let blocker = rusqlite::Connection::open(&db_path).unwrap();
    blocker.execute_batch("BEGIN IMMEDIATE").unwrap();

    let tree = create_test_chain("c1", &["n1", "n2"]);
    let err = storage
        .write_conversation(&create_test_row("c1", "fp1"), &tree, WriteMode::Insert)
        .unwrap_err();
    assert!(matches!(err, StorageError::Busy(_)), "unexpected error: {err:?}");
    assert!(err.is_transient());
    assert!(!err.is_constraint());

    // Readers still proceed while the writer lock is held.
    assert!(storage.get_conversation("c1").unwrap().is_none());

    blocker.execute_batch("ROLLBACK").unwrap();
    assert_eq!(storage.get_stats().unwrap().node_count, 0);

    storage.write_conversation(&create_test_row("c1", "fp1"), &tree, WriteMode::Insert).unwrap();
    assert_eq!(storage.get_stats().unwrap().node_count, 2);
}
