//! Configuration file discovery and CLI overrides
//!
//! A file named with `--config` must exist. Without it the default
//! `<config_dir>/Cartsync/cartsync.toml` is read when present, otherwise the
//! built-in defaults apply.

use crate::app::cli::Args;
use crate::core::settings::{ConfigError, ConfigResult, Settings};
use std::path::{Path, PathBuf};

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Cartsync").join("cartsync.toml"))
}

/// Load settings from `config_file`, or from the default location if it exists
pub async fn load_settings(config_file: Option<&Path>) -> ConfigResult<Settings> {
    let path = match config_file {
        Some(path) => {
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                return Err(ConfigError::Missing {
                    path: path.display().to_string(),
                });
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if tokio::fs::try_exists(&path).await.unwrap_or(false) => path,
            _ => {
                log::debug!("No configuration file found, using defaults");
                return Ok(Settings::default());
            }
        },
    };

    log::debug!("Loading configuration from {}", path.display());
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    Settings::from_toml_str(&contents, &path.display().to_string())
}

/// Let command line flags win over file values
pub fn apply_overrides(settings: &mut Settings, args: &Args) -> ConfigResult<()> {
    if let Some(url) = &args.base_url {
        settings.remote.base_url = Some(url.clone());
    }
    if let Some(level) = &args.log_level {
        settings.logging.level = Some(level.clone());
    }
    if let Some(format) = &args.log_format {
        settings.logging.format = Some(format.clone());
    }
    if let Some(file) = &args.log_file {
        settings.logging.file = Some(file.clone());
    }
    settings.validate()
}
