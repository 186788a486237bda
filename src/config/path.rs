//! Path resolution helpers for configuration files and storage locations.
//!
//! Supports absolute paths, paths relative to the config file, and "~" home
//! directory expansion.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{Result, StoreError};

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "bstore";

/// Resolve a path from a config file.
///
/// Resolution rules:
/// 1. Absolute paths: used as-is
/// 2. Paths starting with `~`: expanded to home directory
/// 3. Relative paths: resolved relative to the config file's directory
pub fn resolve_path(path: &Path, config_dir: &Path) -> Result<PathBuf> {
    trace!(
        path = %path.display(),
        config_dir = %config_dir.display(),
        "Resolving path"
    );

    let path_str = path.to_string_lossy();

    if path_str == "~" || path_str.starts_with("~/") {
        let home = home_dir()?;
        let rest = path_str.strip_prefix("~/").unwrap_or("");
        let resolved = if rest.is_empty() { home } else { home.join(rest) };
        debug!(
            original = %path.display(),
            resolved = %resolved.display(),
            "Expanded home directory path"
        );
        return Ok(resolved);
    }

    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let resolved = config_dir.join(path);
    debug!(
        original = %path.display(),
        resolved = %resolved.display(),
        "Resolved relative path"
    );
    Ok(resolved)
}

/// Resolve the user's home directory (cross-platform).
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| StoreError::ConfigInvalid("Could not determine home directory".to_string()))
}

/// Default data root.
///
/// Location: `~/.local/share/bstore` (platform equivalent elsewhere)
pub fn default_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir().ok_or_else(|| {
        StoreError::ConfigInvalid("Could not determine local data directory".to_string())
    })?;
    Ok(data_dir.join(APP_DIR))
}

/// Default config file location.
///
/// Location: `~/.config/bstore/config.toml` (platform equivalent elsewhere)
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        StoreError::ConfigInvalid("Could not determine config directory".to_string())
    })?;
    Ok(config_dir.join(APP_DIR).join("config.toml"))
}
