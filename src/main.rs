//! bstore CLI - Local photo gallery and per-user preference storage.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::io::{self, IsTerminal};

use clap::Parser;
use console::style;
use serde::Serialize;

use bstore::cli::{self, Cli, Commands, MediaCommand, PrefsCommand};
use bstore::config::StoragePaths;
use bstore::error::{Result, StoreError};
use bstore::logging::init_logging;
use bstore::media::{ImageId, ImageStore, codec};
use bstore::settings::{ReadStatus, SettingsRecord, SettingsStore, SqliteKv};

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> &'static str {
        option_env!("VERGEN_GIT_DIRTY").unwrap_or("false")
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color || !io::stdout().is_terminal() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    init_logging(cli.use_json(), cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        output_error(&cli, &e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        None => print_quick_start(cli),
        Some(Commands::Media(cmd)) => match cmd {
            MediaCommand::Add(args) => cmd_media_add(cli, args),
            MediaCommand::List => cmd_media_list(cli),
            MediaCommand::Delete(args) => cmd_media_delete(cli, args),
            MediaCommand::DeleteAll => cmd_media_delete_all(cli),
        },
        Some(Commands::Prefs(cmd)) => match cmd {
            PrefsCommand::List => cmd_prefs_list(cli),
            PrefsCommand::Show(args) => cmd_prefs_show(cli, args),
            PrefsCommand::Save(args) => cmd_prefs_save(cli, args),
            PrefsCommand::Delete(args) => cmd_prefs_delete(cli, args),
        },
        Some(Commands::Config(args)) => cmd_config(cli, args),
        Some(Commands::Version) => cmd_version(cli),
        Some(Commands::Completions(args)) => cmd_completions(cli, args),
    }
}

// === Quick Start ===

#[derive(Serialize)]
struct QuickStart {
    tool: &'static str,
    version: &'static str,
    description: &'static str,
    media: MediaHelp,
    prefs: PrefsHelp,
    output_modes: OutputModes,
}

#[derive(Serialize)]
struct MediaHelp {
    add: &'static str,
    list: &'static str,
    delete: &'static str,
    delete_all: &'static str,
}

#[derive(Serialize)]
struct PrefsHelp {
    list: &'static str,
    show: &'static str,
    save: &'static str,
    delete: &'static str,
}

#[derive(Serialize)]
struct OutputModes {
    human: &'static str,
    robot: &'static str,
    compact: &'static str,
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn print_quick_start(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        output_json(
            cli,
            &QuickStart {
                tool: "bstore",
                version: build_info::VERSION,
                description: "Local photo gallery and per-user preference storage",
                media: MediaHelp {
                    add: "bstore media add <IMAGE> [--raw] [--quality N]",
                    list: "bstore media list",
                    delete: "bstore media delete <ID>",
                    delete_all: "bstore media delete-all",
                },
                prefs: PrefsHelp {
                    list: "bstore prefs list",
                    show: "bstore prefs show <USER>",
                    save: "bstore prefs save <USER> [--dark-mode] [--notifications] [--language L]",
                    delete: "bstore prefs delete <USER>",
                },
                output_modes: OutputModes {
                    human: "--format=text (default)",
                    robot: "--robot or --format=json",
                    compact: "--format=json-compact",
                },
            },
        );
        return Ok(());
    }

    println!(
        "{} {} - photo gallery and preferences\n",
        style("bstore").bold().cyan(),
        build_info::VERSION
    );

    println!("{}", style("MEDIA").bold().underlined());
    println!("  {}  Save a photo", style("bstore media add photo.png").green());
    println!("  {}  Show the gallery", style("bstore media list").green());
    println!("  {}  Delete all photos", style("bstore media delete-all").green());
    println!();

    println!("{}", style("PREFERENCES").bold().underlined());
    println!(
        "  {}  Save a profile",
        style("bstore prefs save alice --dark-mode -l spanish").green()
    );
    println!("  {}  Load a profile", style("bstore prefs show alice").green());
    println!("  {}  Saved users", style("bstore prefs list").green());
    println!();

    println!("Run {} for full help", style("bstore --help").yellow());
    Ok(())
}

// === Stores ===

fn storage_paths(cli: &Cli) -> Result<StoragePaths> {
    StoragePaths::resolve(cli.config.as_deref(), cli.data_dir.as_deref())
}

fn open_images(cli: &Cli) -> Result<ImageStore> {
    let paths = storage_paths(cli)?;
    ImageStore::open(&paths.images_dir)
}

fn open_settings(cli: &Cli) -> Result<SettingsStore<SqliteKv>> {
    let paths = storage_paths(cli)?;
    let kv = SqliteKv::open(&paths.settings_db)?;
    Ok(SettingsStore::with_key(kv, paths.settings_key))
}

// === Media Commands ===

fn cmd_media_add(cli: &Cli, args: &cli::AddArgs) -> Result<()> {
    let bytes = if args.raw {
        codec::capture_raw(&args.image)?
    } else {
        codec::capture_from_path(&args.image, args.quality)?
    };

    let store = open_images(cli)?;
    let saved = store.save(&bytes)?;

    if cli.use_json() {
        output_json(cli, &saved.summary());
    } else {
        println!("{} Your image has been saved successfully.", style("Image Saved.").green().bold());
        println!("  id:   {}", saved.id);
        println!("  file: {}", saved.path.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct MediaListOutput<'a> {
    count: usize,
    images: Vec<bstore::media::ImageSummary>,
    skipped: &'a [bstore::media::SkippedEntry],
}

fn cmd_media_list(cli: &Cli) -> Result<()> {
    let store = open_images(cli)?;
    let listing = store.list_all()?;

    if cli.use_json() {
        output_json(
            cli,
            &MediaListOutput {
                count: listing.len(),
                images: listing.images.iter().map(|i| i.summary()).collect(),
                skipped: &listing.skipped,
            },
        );
        return Ok(());
    }

    if listing.is_empty() {
        println!("No images saved.");
    } else {
        println!("{}", style(format!("{} image(s)", listing.len())).bold());
        for image in &listing.images {
            let summary = image.summary();
            let dims = match (summary.width, summary.height) {
                (Some(w), Some(h)) => format!("{w}x{h}"),
                _ => "?".to_string(),
            };
            println!(
                "  {}  {:>9}  {:<4}  {} bytes",
                style(&summary.id).cyan(),
                dims,
                summary.format.unwrap_or("?"),
                summary.size_bytes
            );
        }
    }

    if listing.skipped_count() > 0 {
        println!(
            "{}: {} entr{} skipped (not readable images)",
            style("Note").yellow(),
            listing.skipped_count(),
            if listing.skipped_count() == 1 { "y" } else { "ies" }
        );
    }
    Ok(())
}

fn cmd_media_delete(cli: &Cli, args: &cli::DeleteImageArgs) -> Result<()> {
    let store = open_images(cli)?;
    let id = ImageId::from(args.id.as_str());
    let deleted = store.delete(&id)?;

    if cli.use_json() {
        output_json(cli, &serde_json::json!({ "id": id, "deleted": deleted }));
    } else if deleted {
        println!("{} {id}", style("Image Deleted.").green().bold());
    } else {
        println!("No image with id {id}.");
    }
    Ok(())
}

fn cmd_media_delete_all(cli: &Cli) -> Result<()> {
    let store = open_images(cli)?;
    let report = store.delete_all()?;

    if cli.use_json() {
        output_json(cli, &report);
    } else {
        println!(
            "{} All images have been deleted successfully ({} removed).",
            style("Images Deleted.").green().bold(),
            report.removed
        );
    }
    Ok(())
}

// === Preference Commands ===

fn warn_if_corrupt(cli: &Cli, status: &ReadStatus) {
    if let ReadStatus::Corrupt { reason } = status {
        if !cli.use_json() {
            eprintln!(
                "{}: stored settings could not be read and were treated as empty ({reason})",
                style("Warning").yellow()
            );
        }
    }
}

fn cmd_prefs_list(cli: &Cli) -> Result<()> {
    let store = open_settings(cli)?;
    let read = store.load()?;
    let usernames = read.collection.usernames();
    let key = store.key().to_string();
    let last_saved = store.with_backend(|kv| kv.updated_at(&key))?;

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "usernames": usernames,
                "read": read.status,
                "last_saved": last_saved,
            }),
        );
        return Ok(());
    }

    warn_if_corrupt(cli, &read.status);
    if usernames.is_empty() {
        println!("No saved settings.");
        return Ok(());
    }
    for username in &usernames {
        println!("  {}", style(username).cyan());
    }
    if let Some(ts) = last_saved {
        println!("Last saved: {}", ts.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}

fn cmd_prefs_show(cli: &Cli, args: &cli::UserArgs) -> Result<()> {
    let store = open_settings(cli)?;
    let read = store.load()?;
    warn_if_corrupt(cli, &read.status);

    let saved = read.collection.get(&args.username).cloned();
    let is_saved = saved.is_some();
    let record = saved.unwrap_or_else(|| SettingsRecord::with_defaults(args.username.as_str()));

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({ "settings": record, "saved": is_saved }),
        );
        return Ok(());
    }

    if is_saved {
        println!("{}", style(format!("Settings for {}", record.username)).bold());
    } else {
        println!(
            "{}",
            style(format!("No saved settings for {}; showing defaults", record.username)).dim()
        );
    }
    println!("  Dark mode:     {}", on_off(record.dark_mode_enabled));
    println!("  Notifications: {}", on_off(record.notifications_enabled));
    println!("  Language:      {}", record.language);
    Ok(())
}

fn cmd_prefs_save(cli: &Cli, args: &cli::SaveArgs) -> Result<()> {
    let store = open_settings(cli)?;
    let record = SettingsRecord::new(
        args.username.as_str(),
        args.dark_mode,
        args.notifications,
        args.language.as_str(),
    );
    store.upsert(record.clone())?;

    if cli.use_json() {
        output_json(cli, &serde_json::json!({ "saved": true, "settings": record }));
    } else {
        println!(
            "{} Settings for {} have been saved.",
            style("Settings Saved.").green().bold(),
            record.username
        );
    }
    Ok(())
}

fn cmd_prefs_delete(cli: &Cli, args: &cli::UserArgs) -> Result<()> {
    let store = open_settings(cli)?;
    let deleted = store.delete(&args.username)?;

    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({ "username": args.username, "deleted": deleted }),
        );
    } else if deleted {
        println!(
            "{} Settings for {} have been deleted.",
            style("Settings Deleted.").green().bold(),
            args.username
        );
    } else {
        println!("No saved settings for {}.", args.username);
    }
    Ok(())
}

// === Utilities ===

fn cmd_config(cli: &Cli, args: &cli::ConfigArgs) -> Result<()> {
    let paths = storage_paths(cli)?;

    if cli.use_json() {
        output_json(cli, &paths);
    } else if args.path {
        match &paths.config_file {
            Some(path) => println!("{}", path.display()),
            None => println!("(none)"),
        }
    } else {
        let config = paths
            .config_file
            .as_ref()
            .map_or_else(|| "(defaults)".to_string(), |p| p.display().to_string());
        println!("config:       {config}");
        println!("images_dir:   {}", paths.images_dir.display());
        println!("settings_db:  {}", paths.settings_db.display());
        println!("settings_key: {}", paths.settings_key);
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_version(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        output_json(
            cli,
            &serde_json::json!({
                "version": build_info::VERSION,
                "git_sha": build_info::git_sha(),
                "git_dirty": build_info::git_dirty() == "true",
                "build_timestamp": build_info::build_timestamp(),
                "rustc_version": build_info::rustc_semver(),
                "target": build_info::target(),
            }),
        );
    } else {
        println!("bstore {}", build_info::VERSION);
        println!(
            "git: {}{}",
            build_info::git_sha(),
            if build_info::git_dirty() == "true" {
                " (dirty)"
            } else {
                ""
            }
        );
        println!("built: {}", build_info::build_timestamp());
        println!("rustc: {}", build_info::rustc_semver());
        println!("target: {}", build_info::target());
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_completions(_cli: &Cli, args: &cli::CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    clap_complete::generate(args.shell, &mut Cli::command(), "bstore", &mut io::stdout());
    Ok(())
}

const fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn output_json<T: Serialize>(cli: &Cli, data: &T) {
    let json = if cli.use_compact_json() {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    match json {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to encode output: {e}"),
    }
}

fn output_error(cli: &Cli, error: &StoreError) {
    if cli.use_json() {
        let json = serde_json::json!({
            "error": true,
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
        });
        eprintln!("{json:#}");
    } else {
        eprintln!("{}: {}", style("Error").red().bold(), error);
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{}: {}", style("Hint").yellow(), suggestion);
        }
    }
}
