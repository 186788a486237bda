//! Integration tests for settings persistence.

use std::sync::Arc;

use bstore::error::StoreError;
use bstore::settings::{
    DEFAULT_SETTINGS_KEY, KeyValueStore, MemoryKv, ReadStatus, SettingsCollection,
    SettingsRecord, SettingsStore, SqliteKv,
};
use tempfile::TempDir;

use crate::common::init_test_logging;

fn alice() -> SettingsRecord {
    SettingsRecord::new("alice", true, false, "Spanish")
}

#[test]
fn upsert_then_get_returns_exact_record() {
    init_test_logging();
    let store = SettingsStore::new(MemoryKv::new());

    store.upsert(alice()).unwrap();

    assert_eq!(store.get("alice").unwrap(), Some(alice()));
    assert!(store.list_usernames().unwrap().contains("alice"));
}

#[test]
fn second_upsert_overwrites() {
    init_test_logging();
    let store = SettingsStore::new(MemoryKv::new());
    let v2 = SettingsRecord::new("alice", false, true, "Nepali");

    store.upsert(alice()).unwrap();
    store.upsert(v2.clone()).unwrap();

    assert_eq!(store.get("alice").unwrap(), Some(v2));
    assert_eq!(store.list_usernames().unwrap().len(), 1);
}

#[test]
fn never_saved_user_is_absent() {
    init_test_logging();
    let store = SettingsStore::new(MemoryKv::new());
    assert_eq!(store.get("nobody").unwrap(), None);

    store.upsert(alice()).unwrap();
    assert_eq!(store.get("nobody").unwrap(), None);
    // Lookups are case-sensitive
    assert_eq!(store.get("Alice").unwrap(), None);
}

#[test]
fn delete_of_unknown_user_changes_nothing() {
    init_test_logging();
    let store = SettingsStore::new(MemoryKv::new());
    store.upsert(alice()).unwrap();
    let before = store.list_usernames().unwrap();

    assert!(!store.delete("bob").unwrap());
    assert!(!store.delete("bob").unwrap());

    assert_eq!(store.list_usernames().unwrap(), before);
}

#[test]
fn delete_twice_is_a_noop() {
    init_test_logging();
    let store = SettingsStore::new(MemoryKv::new());
    store.upsert(alice()).unwrap();

    assert!(store.delete("alice").unwrap());
    assert!(!store.delete("alice").unwrap());
    assert!(store.list_usernames().unwrap().is_empty());
}

#[test]
fn collection_round_trips_through_json() {
    let collection: SettingsCollection = [
        alice(),
        SettingsRecord::new("bob", false, true, "English"),
        SettingsRecord::new("chandra", true, true, "Nepali"),
    ]
    .into_iter()
    .collect();

    let json = collection.to_json().unwrap();
    let decoded = SettingsCollection::from_json(&json).unwrap();
    assert_eq!(decoded, collection);
}

#[test]
fn stored_blob_uses_camel_case_fields() {
    init_test_logging();
    let store = SettingsStore::new(MemoryKv::new());
    store.upsert(alice()).unwrap();

    let raw = store
        .with_backend(|kv| kv.get(DEFAULT_SETTINGS_KEY))
        .unwrap()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &value["alice"];
    assert_eq!(entry["username"], "alice");
    assert_eq!(entry["darkModeEnabled"], true);
    assert_eq!(entry["notificationsEnabled"], false);
    assert_eq!(entry["language"], "Spanish");
}

#[test]
fn corrupt_blob_reads_empty_and_is_replaced() {
    init_test_logging();
    let kv = MemoryKv::with_entry(DEFAULT_SETTINGS_KEY, "{ not json");
    let store = SettingsStore::new(kv);

    let read = store.load().unwrap();
    assert!(read.collection.is_empty());
    assert!(matches!(read.status, ReadStatus::Corrupt { .. }));
    assert_eq!(store.get("alice").unwrap(), None);

    store.upsert(alice()).unwrap();
    let read = store.load().unwrap();
    assert_eq!(read.status, ReadStatus::Loaded);
    assert_eq!(read.collection.len(), 1);
}

#[test]
fn empty_username_is_rejected() {
    init_test_logging();
    let store = SettingsStore::new(MemoryKv::new());
    let err = store
        .upsert(SettingsRecord::with_defaults(""))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidUsername));
    assert_eq!(store.load().unwrap().status, ReadStatus::Missing);
}

#[test]
fn sqlite_file_persists_across_reopen() {
    init_test_logging();
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("nested").join("settings.db");

    {
        let store = SettingsStore::new(SqliteKv::open(&db).unwrap());
        store.upsert(alice()).unwrap();
        store
            .upsert(SettingsRecord::new("bob", false, true, "English"))
            .unwrap();
        store.delete("bob").unwrap();
    }

    let store = SettingsStore::new(SqliteKv::open(&db).unwrap());
    assert_eq!(store.get("alice").unwrap(), Some(alice()));
    assert_eq!(store.get("bob").unwrap(), None);

    let key = store.key().to_string();
    let saved_at = store.with_backend(|kv| kv.updated_at(&key)).unwrap();
    assert!(saved_at.is_some());
}

#[test]
fn custom_key_isolates_collections() {
    init_test_logging();
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("settings.db");

    let default_store = SettingsStore::new(SqliteKv::open(&db).unwrap());
    default_store.upsert(alice()).unwrap();
    drop(default_store);

    let other = SettingsStore::with_key(SqliteKv::open(&db).unwrap(), "profiles");
    assert_eq!(other.load().unwrap().status, ReadStatus::Missing);
    assert_eq!(other.get("alice").unwrap(), None);
}

#[test]
fn concurrent_upserts_keep_every_user() {
    init_test_logging();
    let store = Arc::new(SettingsStore::new(SqliteKv::in_memory().unwrap()));

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                store
                    .upsert(SettingsRecord::new(format!("user{i}"), i % 2 == 0, false, "English"))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.list_usernames().unwrap().len(), 10);
}
