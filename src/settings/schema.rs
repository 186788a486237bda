//! Settings record and collection types.
//!
//! The collection is persisted as a JSON object keyed by username:
//!
//! ```json
//! {
//!   "alice": {
//!     "username": "alice",
//!     "darkModeEnabled": true,
//!     "notificationsEnabled": false,
//!     "language": "Spanish"
//!   }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Language stored when a record does not name one.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Languages offered by the preferences screen.
///
/// Records store the language as a plain string so new languages can be
/// added without touching persisted data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Language {
    #[default]
    English,
    Spanish,
    Nepali,
}

impl Language {
    /// All known languages, in display order.
    pub const ALL: [Self; 3] = [Self::English, Self::Spanish, Self::Nepali];

    /// Name as persisted in a record.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Spanish => "Spanish",
            Self::Nepali => "Nepali",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreError::Other(format!("Unknown language: {s}")))
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// One user's preference profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    /// Lookup key. Compared exactly, case-sensitive.
    ///
    /// May be absent in the stored blob; the collection fills it from the
    /// map key on decode.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub dark_mode_enabled: bool,
    #[serde(default)]
    pub notifications_enabled: bool,
    #[serde(default = "default_language")]
    pub language: String,
}

impl SettingsRecord {
    /// Create a record with every field given.
    pub fn new(
        username: impl Into<String>,
        dark_mode_enabled: bool,
        notifications_enabled: bool,
        language: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            dark_mode_enabled,
            notifications_enabled,
            language: language.into(),
        }
    }

    /// The profile shown for a user with nothing saved: dark mode off,
    /// notifications off, English.
    ///
    /// The store never returns this on its own; callers apply it when a
    /// lookup comes back empty.
    pub fn with_defaults(username: impl Into<String>) -> Self {
        Self::new(username, false, false, DEFAULT_LANGUAGE)
    }
}

/// All settings records, keyed by username.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsCollection(BTreeMap<String, SettingsRecord>);

impl SettingsCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a record by exact username.
    #[must_use]
    pub fn get(&self, username: &str) -> Option<&SettingsRecord> {
        self.0.get(username)
    }

    /// Insert or replace the record for `record.username`.
    ///
    /// Returns the record that was replaced, if any.
    pub fn upsert(&mut self, record: SettingsRecord) -> Option<SettingsRecord> {
        self.0.insert(record.username.clone(), record)
    }

    /// Remove the record for `username`, if present.
    pub fn remove(&mut self, username: &str) -> Option<SettingsRecord> {
        self.0.remove(username)
    }

    /// Set of usernames with a saved record.
    #[must_use]
    pub fn usernames(&self) -> BTreeSet<String> {
        self.0.keys().cloned().collect()
    }

    /// Iterate over all records.
    pub fn iter(&self) -> impl Iterator<Item = &SettingsRecord> {
        self.0.values()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the collection holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode as the persisted JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode the persisted JSON object.
    ///
    /// The map key is authoritative: a record whose embedded `username`
    /// is missing or disagrees with its key is stored under the key.
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut map: BTreeMap<String, SettingsRecord> = serde_json::from_str(raw)?;
        for (key, record) in &mut map {
            if record.username != *key {
                record.username.clone_from(key);
            }
        }
        Ok(Self(map))
    }
}

impl FromIterator<SettingsRecord> for SettingsCollection {
    fn from_iter<I: IntoIterator<Item = SettingsRecord>>(iter: I) -> Self {
        let mut collection = Self::new();
        for record in iter {
            collection.upsert(record);
        }
        collection
    }
}
