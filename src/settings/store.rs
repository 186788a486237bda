//! Username-keyed settings persisted as a single blob.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::kv::KeyValueStore;
use super::schema::{SettingsCollection, SettingsRecord};
use crate::error::{Result, StoreError};

/// Key the collection is stored under unless configured otherwise.
pub const DEFAULT_SETTINGS_KEY: &str = "userSettings";

/// How the stored collection was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReadStatus {
    /// The blob was present and decoded.
    Loaded,
    /// Nothing has been saved yet.
    Missing,
    /// The blob was present but could not be decoded; read as empty.
    Corrupt { reason: String },
}

/// A collection together with how it was obtained.
#[derive(Debug, Clone)]
pub struct CollectionRead {
    pub collection: SettingsCollection,
    pub status: ReadStatus,
}

/// Settings records for all users, stored as one value in a key-value
/// namespace.
///
/// Every mutation is a read-modify-write of the whole collection, done under
/// the store's lock so concurrent callers in one process cannot lose updates.
/// Writers in other processes are not coordinated.
pub struct SettingsStore<K: KeyValueStore> {
    backend: Mutex<K>,
    key: String,
}

impl<K: KeyValueStore> SettingsStore<K> {
    /// Create a store using [`DEFAULT_SETTINGS_KEY`].
    pub fn new(backend: K) -> Self {
        Self::with_key(backend, DEFAULT_SETTINGS_KEY)
    }

    /// Create a store that keeps the collection under `key`.
    pub fn with_key(backend: K, key: impl Into<String>) -> Self {
        Self {
            backend: Mutex::new(backend),
            key: key.into(),
        }
    }

    /// The key the collection is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    fn lock(&self) -> MutexGuard<'_, K> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with shared access to the backend.
    pub fn with_backend<R>(&self, f: impl FnOnce(&K) -> R) -> R {
        f(&*self.lock())
    }

    /// Consume the store and return its backend.
    pub fn into_backend(self) -> K {
        self.backend.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the whole collection, reporting whether it was present, missing
    /// or corrupt.
    ///
    /// Missing and corrupt data both yield an empty collection. Only a
    /// failure of the backend itself is an error.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn load(&self) -> Result<CollectionRead> {
        let kv = self.lock();
        read_collection(&*kv, &self.key)
    }

    /// Look up the record for `username`.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn get(&self, username: &str) -> Result<Option<SettingsRecord>> {
        let read = self.load()?;
        let record = read.collection.get(username).cloned();
        debug!(found = record.is_some(), "Settings lookup");
        Ok(record)
    }

    /// Insert or overwrite the record for `record.username`.
    #[instrument(skip_all, fields(key = %self.key, username = %record.username))]
    pub fn upsert(&self, record: SettingsRecord) -> Result<()> {
        if record.username.is_empty() {
            return Err(StoreError::InvalidUsername);
        }

        let mut kv = self.lock();
        let CollectionRead { mut collection, .. } = read_collection(&*kv, &self.key)?;
        let replaced = collection.upsert(record).is_some();
        write_collection(&mut *kv, &self.key, &collection)?;

        info!(replaced, "Settings saved");
        Ok(())
    }

    /// Remove the record for `username`.
    ///
    /// Returns false, without writing, if there was no such record. Removing
    /// the last record clears the key instead of storing an empty object.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn delete(&self, username: &str) -> Result<bool> {
        let mut kv = self.lock();
        let CollectionRead { mut collection, .. } = read_collection(&*kv, &self.key)?;

        if collection.remove(username).is_none() {
            debug!("No settings to delete");
            return Ok(false);
        }

        if collection.is_empty() {
            kv.remove(&self.key).inspect_err(|e| {
                warn!(error = %e, "Failed to clear settings");
            })?;
        } else {
            write_collection(&mut *kv, &self.key, &collection)?;
        }
        info!(remaining = collection.len(), "Settings deleted");
        Ok(true)
    }

    /// Usernames that have a saved record.
    pub fn list_usernames(&self) -> Result<BTreeSet<String>> {
        Ok(self.load()?.collection.usernames())
    }
}

fn read_collection<K: KeyValueStore + ?Sized>(kv: &K, key: &str) -> Result<CollectionRead> {
    let raw = match kv.get(key)? {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => {
            debug!("No settings stored yet");
            return Ok(CollectionRead {
                collection: SettingsCollection::new(),
                status: ReadStatus::Missing,
            });
        }
    };

    match SettingsCollection::from_json(&raw) {
        Ok(collection) => {
            debug!(records = collection.len(), "Settings loaded");
            Ok(CollectionRead {
                collection,
                status: ReadStatus::Loaded,
            })
        }
        Err(e) => {
            warn!(error = %e, "Stored settings are corrupt, reading as empty");
            Ok(CollectionRead {
                collection: SettingsCollection::new(),
                status: ReadStatus::Corrupt {
                    reason: e.to_string(),
                },
            })
        }
    }
}

fn write_collection<K: KeyValueStore + ?Sized>(
    kv: &mut K,
    key: &str,
    collection: &SettingsCollection,
) -> Result<()> {
    let raw = collection.to_json()?;
    kv.set(key, &raw).inspect_err(|e| {
        warn!(error = %e, "Failed to write settings");
    })
}
