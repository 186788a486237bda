//! Per-user preference storage.
//!
//! All records live in one JSON value under a fixed key (`userSettings` by
//! default) of a key-value namespace. The namespace is injected: `SqliteKv`
//! for on-disk storage, `MemoryKv` for tests.
//!
//! # Usage
//!
//! ```ignore
//! use bstore::settings::{SettingsRecord, SettingsStore, SqliteKv};
//!
//! let store = SettingsStore::new(SqliteKv::open("/path/to/settings.db")?);
//! store.upsert(SettingsRecord::new("alice", true, false, "Spanish"))?;
//!
//! let shown = store
//!     .get("alice")?
//!     .unwrap_or_else(|| SettingsRecord::with_defaults("alice"));
//! ```

mod kv;
mod schema;
mod store;

pub use kv::{KeyValueStore, MemoryKv, SqliteKv};
pub use schema::{DEFAULT_LANGUAGE, Language, SettingsCollection, SettingsRecord};
pub use store::{CollectionRead, DEFAULT_SETTINGS_KEY, ReadStatus, SettingsStore};
