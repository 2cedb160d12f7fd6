//! Configuration loading utilities for CLI commands

use crate::errors;
use anyhow::{Context, Result};
use geometrics_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::Path;

/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "geometrics.toml";

/// Load layered configuration: defaults, file, environment
///
/// An explicit `config_path` must exist; the default file is optional.
pub fn load_config(config_path: Option<&Path>) -> Result<LayeredConfig> {
    let config = match config_path {
        Some(path) => {
            if !path.exists() {
                return Err(errors::config_file_not_found(path).into());
            }
            LayeredConfig::with_defaults()
                .load_from_file(path)
                .with_context(|| format!("Failed to load configuration file {}", path.display()))?
        }
        None => LayeredConfig::with_defaults()
            .load_from_file_if_exists(DEFAULT_CONFIG_FILE)
            .context("Failed to load configuration file")?,
    };

    let config = config
        .load_from_env()
        .context("Failed to read configuration from environment")?;

    Ok(config)
}

/// Load layered configuration with CLI overrides
pub fn load_config_with_overrides(
    config_path: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = load_config(config_path)?;
    config.update_from_cli(overrides);
    Ok(config)
}

/// Name of the file the configuration was read from, if any
pub fn config_file_in_use(config_path: Option<&Path>) -> Option<String> {
    match config_path {
        Some(path) => Some(path.display().to_string()),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            default.exists().then(|| default.display().to_string())
        }
    }
}
