//! Config files driving real stores.

use bstore::config::{StoragePaths, load_config};
use bstore::error::StoreError;
use bstore::media::ImageStore;
use bstore::settings::{SettingsRecord, SettingsStore, SqliteKv};
use tempfile::TempDir;

use crate::common::fixtures::png_bytes;
use crate::common::init_test_logging;

#[test]
fn yaml_config_places_both_stores() {
    init_test_logging();
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("bstore.yaml");
    std::fs::write(
        &config,
        "storage:\n  images_dir: gallery\n  settings_db: state/prefs.db\n  settings_key: prefs\n",
    )
    .unwrap();

    let paths = StoragePaths::resolve(Some(&config), None).unwrap();
    assert_eq!(paths.images_dir, temp.path().join("gallery"));

    let images = ImageStore::open(&paths.images_dir).unwrap();
    images.save(&png_bytes(2, 2, [5, 5, 5])).unwrap();
    assert!(temp.path().join("gallery").is_dir());

    let settings =
        SettingsStore::with_key(SqliteKv::open(&paths.settings_db).unwrap(), paths.settings_key);
    settings.upsert(SettingsRecord::with_defaults("alice")).unwrap();
    assert!(temp.path().join("state/prefs.db").is_file());
    assert_eq!(settings.key(), "prefs");
}

#[test]
fn explicit_missing_config_is_an_error() {
    init_test_logging();
    let temp = TempDir::new().unwrap();
    let err = StoragePaths::resolve(Some(&temp.path().join("absent.toml")), None).unwrap_err();
    assert!(matches!(err, StoreError::ConfigNotFound { .. }));
    assert!(err.is_user_recoverable());
}

#[test]
fn unknown_extension_is_a_parse_error() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("bstore.ini");
    std::fs::write(&config, "[storage]").unwrap();
    assert!(matches!(load_config(&config), Err(StoreError::ConfigParse(_))));
}
