//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use cookiejar_core::persisted_store_path;

/// Environment variable carrying key material for encrypted stores.
pub const MASTER_KEY_ENV: &str = "COOKIEJAR_MASTER_KEY";

/// TOML-backed file configuration for cookiejar defaults.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Cookie store file location.
    pub store_path: Option<PathBuf>,
    /// Encrypt the store at rest.
    pub encrypt: Option<bool>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }

    /// Tracing filter level for this setting.
    #[must_use]
    pub fn log_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
    /// Indicates whether configuration was loaded from disk.
    pub loaded_from_file: bool,
}

/// Effective store settings after merging CLI flags over the config file.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Cookie store file location.
    pub store_path: PathBuf,
    /// Encryption key material, present when the store is encrypted.
    pub master_key: Option<String>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/cookiejar/config.toml`
/// 2. `$HOME/.config/cookiejar/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("cookiejar")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("cookiejar")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
        loaded_from_file: true,
    })
}

/// Merges CLI overrides over the file config and reads the master key.
///
/// # Errors
///
/// Fails when no store path can be resolved, or when encryption is requested
/// without [`MASTER_KEY_ENV`] set.
pub fn resolve_store_settings(
    cli_store: Option<&Path>,
    cli_encrypt: bool,
    config: Option<&FileConfig>,
) -> Result<StoreSettings> {
    let store_path = match cli_store
        .map(Path::to_path_buf)
        .or_else(|| config.and_then(|c| c.store_path.clone()))
    {
        Some(path) => path,
        None => persisted_store_path().context("Failed to resolve cookie store path")?,
    };

    let encrypt = cli_encrypt || config.and_then(|c| c.encrypt).unwrap_or(false);
    let master_key = if encrypt {
        let key = env::var(MASTER_KEY_ENV).unwrap_or_default();
        let key = key.trim();
        if key.is_empty() {
            bail!("Store encryption requested but {MASTER_KEY_ENV} is not set");
        }
        Some(key.to_string())
    } else {
        None
    };

    Ok(StoreSettings {
        store_path,
        master_key,
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "store_path" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `store_path` value on line {}", line_index + 1)
                })?;
                if parsed.trim().is_empty() {
                    bail!("Invalid `store_path` value on line {}: empty path", line_index + 1);
                }
                cfg.store_path = Some(PathBuf::from(parsed));
            }
            "encrypt" => {
                let parsed = parse_boolean(value).with_context(|| {
                    format!("Invalid `encrypt` value on line {}", line_index + 1)
                })?;
                cfg.encrypt = Some(parsed);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `verbosity` value on line {}", line_index + 1)
                })?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!(
                        "Invalid `verbosity` value '{}' on line {}",
                        parsed,
                        line_index + 1
                    )
                })?);
            }
            unknown => {
                bail!(
                    "Unknown configuration key: '{}' on line {}",
                    unknown,
                    line_index + 1
                );
            }
        }
    }
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected boolean value (true/false)"),
    }
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}
