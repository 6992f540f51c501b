// Configuration management

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::AppConfig;

pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("storychat");

    fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

    Ok(config_dir)
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

pub fn default_log_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("storychat.log"))
}

/// Loads the config from `path`, or from the default location when `None`.
/// A missing file is created with defaults.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config_from(path),
        None => load_config_from(&get_config_path()?),
    }
}

pub fn load_config_from(config_path: &Path) -> Result<AppConfig> {
    if !config_path.exists() {
        let default_config = AppConfig::default();
        save_config_to(config_path, &default_config)?;
        return Ok(default_config);
    }

    let contents = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;

    Ok(config)
}

pub fn save_config_to(config_path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(config_path, contents).context("Failed to write config file")?;

    Ok(())
}
