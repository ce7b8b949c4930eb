mod schema;

pub use schema::{Config, ExportConfig, PennyCriteria};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Get the config directory path (~/.config/penny-scan/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("penny-scan"))
}

/// Get the default config file path (~/.config/penny-scan/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   and falls back to built-in defaults when that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let default_path = match path {
        Some(_) => None,
        None => get_config_path()
            .map_err(|e| debug!("no default config location: {:#}", e))
            .ok(),
    };
    load_config_or_default(path, default_path)
}

/// Load an explicit config file, or the default one when it exists.
///
/// With no explicit path and no default location (no home directory), or a
/// default location holding no file, the built-in defaults are returned.
pub fn load_config_or_default(
    path: Option<PathBuf>,
    default_path: Option<PathBuf>,
) -> Result<Config> {
    let config_path = match (path, default_path) {
        (Some(p), _) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            p
        }
        (None, Some(p)) if p.exists() => p,
        (None, Some(p)) => {
            debug!(path = %p.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        (None, None) => {
            debug!("no config location, using defaults");
            return Ok(Config::default());
        }
    };

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    debug!(path = %config_path.display(), "loaded config");
    Ok(config)
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let thresholds = [
        ("penny.max_price", config.penny.max_price),
        ("penny.max_market_cap", config.penny.max_market_cap),
        ("penny.min_promoter_holding", config.penny.min_promoter_holding),
    ];
    for (name, value) in thresholds {
        if !value.is_finite() || value < 0.0 {
            errors.push(format!("{}: must be a non-negative number, got {}", name, value));
        }
    }

    if config.penny.min_promoter_holding > 100.0 {
        errors.push("penny.min_promoter_holding: must not exceed 100".to_string());
    }

    if config.export.suffix.is_empty() {
        errors.push("export.suffix: must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
