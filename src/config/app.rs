//! Application configuration: where images and settings live.
//!
//! # Example TOML
//!
//! ```toml
//! [storage]
//! images_dir = "~/Pictures/bstore"
//! settings_db = "settings.db"
//! settings_key = "userSettings"
//! ```
//!
//! Every field is optional. Relative paths are resolved against the
//! directory containing the config file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use super::path::{default_config_path, default_data_dir, resolve_path};
use crate::error::{Result, StoreError};
use crate::settings::DEFAULT_SETTINGS_KEY;

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format (.yaml, .yml).
    Yaml,
    /// TOML format (.toml).
    Toml,
}

impl ConfigFormat {
    /// Detect format from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSection,
}

/// `[storage]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory holding saved images.
    pub images_dir: Option<PathBuf>,
    /// SQLite file holding the settings key-value table.
    pub settings_db: Option<PathBuf>,
    /// Key the settings collection is stored under.
    pub settings_key: Option<String>,
}

impl AppConfig {
    /// Check values that cannot be caught by deserialization.
    pub fn validate(&self) -> Result<()> {
        if let Some(key) = &self.storage.settings_key {
            if key.trim().is_empty() {
                return Err(StoreError::ConfigInvalid(
                    "storage.settings_key must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Load configuration from a file, choosing the parser by extension.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();

    let format = ConfigFormat::from_extension(path).ok_or_else(|| {
        StoreError::ConfigParse(format!(
            "Unknown config format for '{}': expected .toml, .yaml, or .yml",
            path.display()
        ))
    })?;

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StoreError::ConfigNotFound {
                path: path.display().to_string(),
            }
        } else {
            StoreError::Io(e)
        }
    })?;
    debug!(bytes = content.len(), format = ?format, "Read config file");

    load_config_from_str(&content, format)
}

/// Parse configuration content in the given format.
pub fn load_config_from_str(content: &str, format: ConfigFormat) -> Result<AppConfig> {
    trace!("Parsing config content");

    let config: AppConfig = match format {
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| StoreError::ConfigParse(format!("TOML: {e}")))?
        }
        ConfigFormat::Yaml if content.trim().is_empty() => AppConfig::default(),
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| StoreError::ConfigParse(format!("YAML: {e}")))?,
    };

    config.validate()?;
    Ok(config)
}

/// Fully resolved storage locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoragePaths {
    /// Directory holding saved images.
    pub images_dir: PathBuf,
    /// SQLite file holding settings.
    pub settings_db: PathBuf,
    /// Key the settings collection is stored under.
    pub settings_key: String,
    /// Config file the values came from, if any.
    pub config_file: Option<PathBuf>,
}

impl StoragePaths {
    /// Defaults under a data root: `<root>/images` and `<root>/settings.db`.
    #[must_use]
    pub fn under(data_root: &Path) -> Self {
        Self {
            images_dir: data_root.join("images"),
            settings_db: data_root.join("settings.db"),
            settings_key: DEFAULT_SETTINGS_KEY.to_string(),
            config_file: None,
        }
    }

    /// Apply a loaded config on top of the defaults.
    ///
    /// `config_dir` anchors relative paths; without it they are taken
    /// relative to `data_root`.
    pub fn from_config(config: &AppConfig, config_dir: Option<&Path>, data_root: &Path) -> Result<Self> {
        let mut paths = Self::under(data_root);
        let base = config_dir.unwrap_or(data_root);

        if let Some(dir) = &config.storage.images_dir {
            paths.images_dir = resolve_path(dir, base)?;
        }
        if let Some(db) = &config.storage.settings_db {
            paths.settings_db = resolve_path(db, base)?;
        }
        if let Some(key) = &config.storage.settings_key {
            paths.settings_key.clone_from(key);
        }
        Ok(paths)
    }

    /// Resolve storage locations for a CLI invocation.
    ///
    /// Precedence: `data_dir` flag, then the config file, then platform
    /// defaults. An explicit `config` path must exist; the default config
    /// file is only read when present.
    #[instrument(skip_all)]
    pub fn resolve(config: Option<&Path>, data_dir: Option<&Path>) -> Result<Self> {
        let config_path = match config {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().ok().filter(|p| p.is_file()),
        };

        let app_config = match &config_path {
            Some(path) => load_config(path)?,
            None => AppConfig::default(),
        };

        let data_root = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_data_dir()?,
        };

        let mut paths = Self::from_config(
            &app_config,
            config_path.as_deref().and_then(Path::parent),
            &data_root,
        )?;

        if data_dir.is_some() {
            let flagged = Self::under(&data_root);
            paths.images_dir = flagged.images_dir;
            paths.settings_db = flagged.settings_db;
        }
        paths.config_file = config_path;

        info!(
            images_dir = %paths.images_dir.display(),
            settings_db = %paths.settings_db.display(),
            "Storage locations resolved"
        );
        Ok(paths)
    }
}
