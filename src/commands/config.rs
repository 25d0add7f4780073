//! Config command handlers: show effective configuration.

use anyhow::Result;

use crate::app_config::{LoadedConfig, MASTER_KEY_ENV, StoreSettings, VerbositySetting};

pub fn run_config_show_command(
    loaded_config: &LoadedConfig,
    settings: &StoreSettings,
    log_level: &str,
) -> Result<()> {
    let resolved_path = loaded_config.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {resolved_path}");
    println!(
        "config_file = {}",
        if loaded_config.loaded_from_file {
            "loaded"
        } else {
            "not found (using defaults)"
        }
    );
    println!("store_path = {}", settings.store_path.display());
    println!("encrypt = {}", settings.master_key.is_some());
    println!(
        "master_key = {}",
        if settings.master_key.is_some() {
            format!("[from {MASTER_KEY_ENV}]")
        } else {
            "<none>".to_string()
        }
    );
    let verbosity = loaded_config
        .config
        .as_ref()
        .and_then(|config| config.verbosity)
        .unwrap_or(VerbositySetting::Default);
    println!("verbosity = {}", verbosity.as_str());
    println!("log_level = {log_level}");

    Ok(())
}
