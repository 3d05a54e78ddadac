use super::*;

#[test]
fn memory_storage_round_trips_values() {
    let storage = MemoryStorage::new();
    assert!(storage.is_empty());
    storage.set_item("theme", "dark");
    assert_eq!(storage.get_item("theme").as_deref(), Some("dark"));
    assert_eq!(storage.len(), 1);
}

#[test]
fn memory_storage_missing_key_is_none() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get_item("language"), None);
}

#[test]
fn memory_storage_counts_every_write() {
    let storage = MemoryStorage::new();
    storage.set_item("theme", "dark");
    storage.set_item("theme", "dark");
    assert_eq!(storage.write_count(), 2);
}

#[test]
fn memory_storage_remove_deletes_key() {
    let storage = MemoryStorage::with_items([("language", "en")]);
    storage.remove_item("language");
    assert_eq!(storage.get_item("language"), None);
    assert_eq!(storage.write_count(), 0);
}
