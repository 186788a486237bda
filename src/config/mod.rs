//! Configuration module.
//!
//! Resolves where the image directory and the settings database live, from
//! CLI flags, an optional TOML/YAML config file and platform defaults.

mod app;
mod path;

pub use app::{
    AppConfig, ConfigFormat, StoragePaths, StorageSection, load_config, load_config_from_str,
};
pub use path::{APP_DIR, default_config_path, default_data_dir, home_dir, resolve_path};
