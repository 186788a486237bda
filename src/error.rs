//! Error types for bstore storage operations.

use std::path::PathBuf;

use thiserror::Error;

/// An entry `delete_all` could not remove.
#[derive(Debug)]
pub struct FailedRemoval {
    /// Path of the entry that is still on disk.
    pub path: PathBuf,
    /// Why the removal failed.
    pub reason: String,
}

/// Primary error type for bstore operations.
#[derive(Error, Debug)]
pub enum StoreError {
    // Image store errors
    #[error("Failed to write image {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list image directory {}: {source}", path.display())]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Deleted {removed} entries but {} could not be removed: {}", failed.len(), failed_paths(failed))]
    Delete {
        removed: usize,
        failed: Vec<FailedRemoval>,
    },

    #[error("Image could not be decoded: {0}")]
    ImageDecode(String),

    #[error("Image file not found: {path}")]
    ImageNotFound { path: String },

    // Settings store errors
    #[error("Settings serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Key-value store error: {0}")]
    KeyValue(String),

    #[error("Username must not be empty")]
    InvalidUsername,

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

fn failed_paths(failed: &[FailedRemoval]) -> String {
    failed
        .iter()
        .map(|f| f.path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl StoreError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidUsername
                | Self::ImageNotFound { .. }
                | Self::ImageDecode(_)
                | Self::ConfigNotFound { .. }
                | Self::ConfigParse(_)
                | Self::ConfigInvalid(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidUsername => Some("Provide a non-empty username"),
            Self::ImageDecode(_) => Some("Use a PNG, JPEG, GIF, BMP or WebP file, or pass --raw"),
            Self::Write { .. } => Some("Check free disk space and directory permissions"),
            Self::List { .. } => Some("Check that the image directory exists (see: bstore config)"),
            Self::Delete { .. } => Some("Check file permissions, then run: bstore media delete-all"),
            Self::ConfigNotFound { .. } => Some("Check the --config path"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using StoreError.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| StoreError::Other(format!("{}: {e}", f().into())))
    }
}
