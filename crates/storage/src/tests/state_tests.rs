use super::create_test_storage;

#[test]
fn test_state_round_trip_and_overwrite() {
    let (storage, _temp_dir) = create_test_storage();
    assert!(storage.get_state("k").unwrap().is_none());

    storage.set_state("k", "v1").unwrap();
    storage.set_state("k", "v2").unwrap();
    assert_eq!(storage.get_state("k").unwrap().as_deref(), Some("v2"));
    assert_eq!(storage.get_stats().unwrap().state_count, 1);
}
