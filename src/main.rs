//! CLI entry point for the cookiejar tool.

use anyhow::{Context, Result};
use clap::Parser;
use cookiejar_core::{CookieJar, FileStore};
use tracing::{debug, info};

mod app_config;
mod cli;
mod commands;

use app_config::{FileConfig, StoreSettings, load_default_file_config, resolve_store_settings};
use cli::{Cli, Command, ConfigCommand};

fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();
    let loaded_config = load_default_file_config()?;

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > info
    let default_level = log_level(&cli, loaded_config.config.as_ref());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?cli, "CLI arguments parsed");

    let settings = resolve_store_settings(
        cli.store.as_deref(),
        cli.encrypt,
        loaded_config.config.as_ref(),
    )?;

    if let Command::Config(ConfigCommand::Show) = &cli.command {
        return commands::run_config_show_command(&loaded_config, &settings, default_level);
    }

    let jar = open_jar(&settings)?;
    match &cli.command {
        Command::Set(args) => commands::run_set_command(&jar, args),
        Command::AddRaw(args) => commands::run_add_raw_command(&jar, args),
        Command::List(args) => commands::run_list_command(&jar, args),
        Command::Sweep => commands::run_sweep_command(&jar),
        Command::Clear => commands::run_clear_command(&jar),
        Command::Config(_) => Ok(()),
    }
}

fn log_level(cli: &Cli, config: Option<&FileConfig>) -> &'static str {
    if cli.quiet {
        return "error";
    }
    match cli.verbose {
        0 => config
            .and_then(|c| c.verbosity)
            .map_or("info", app_config::VerbositySetting::log_level),
        1 => "debug",
        _ => "trace",
    }
}

fn open_jar(settings: &StoreSettings) -> Result<CookieJar> {
    let path = &settings.store_path;
    let store = match &settings.master_key {
        Some(key) => FileStore::open_encrypted(path, key),
        None => FileStore::open(path),
    }
    .with_context(|| format!("Failed to open cookie store '{}'", path.display()))?;

    info!(
        path = %store.path().display(),
        encrypted = store.is_encrypted(),
        "Opened cookie store"
    );
    Ok(CookieJar::open(store))
}
