//! CLI argument definitions and command dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::media::codec::DEFAULT_JPEG_QUALITY;
use crate::settings::Language;

/// bstore - Local photo gallery and per-user preference storage.
///
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "bstore", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "BSTORE_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose logging (repeat for more detail)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only log errors)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Config file (TOML or YAML)
    #[arg(long, short = 'c', global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Data root holding images/ and settings.db (overrides the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Photo gallery: save, list and delete images
    #[command(subcommand)]
    Media(MediaCommand),

    /// User preferences: save, show and delete settings profiles
    #[command(subcommand, visible_alias = "settings")]
    Prefs(PrefsCommand),

    /// Show resolved storage locations
    Config(ConfigArgs),

    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Gallery commands.
#[derive(Subcommand, Debug)]
pub enum MediaCommand {
    /// Save a picked image into the gallery
    Add(AddArgs),

    /// List saved images
    #[command(visible_alias = "ls")]
    List,

    /// Delete one image by id
    Delete(DeleteImageArgs),

    /// Delete every image in the gallery
    DeleteAll,
}

/// Preference commands.
#[derive(Subcommand, Debug)]
pub enum PrefsCommand {
    /// List usernames with saved settings
    #[command(visible_alias = "ls")]
    List,

    /// Show a user's settings (defaults if nothing is saved)
    Show(UserArgs),

    /// Save a user's settings, replacing any previous profile
    Save(SaveArgs),

    /// Delete a user's settings
    Delete(UserArgs),
}

// === Argument Structs ===

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Image file to save (PNG, JPEG, GIF, BMP, WebP)
    pub image: PathBuf,

    /// Store the file's bytes unchanged instead of re-encoding to JPEG
    #[arg(long)]
    pub raw: bool,

    /// JPEG quality used when re-encoding (1-100)
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,
}

#[derive(Parser, Debug)]
pub struct DeleteImageArgs {
    /// Image id as shown by `media list`
    pub id: String,
}

#[derive(Parser, Debug)]
pub struct UserArgs {
    /// Username (exact, case-sensitive)
    pub username: String,
}

#[derive(Parser, Debug)]
pub struct SaveArgs {
    /// Username (exact, case-sensitive)
    pub username: String,

    /// Enable dark mode
    #[arg(long)]
    pub dark_mode: bool,

    /// Enable notifications
    #[arg(long)]
    pub notifications: bool,

    /// Preferred language
    #[arg(long, short = 'l', default_value = "english")]
    pub language: Language,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Only print the config file path
    #[arg(long)]
    pub path: bool,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
