//! Configuration loading from file system

use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::DEFAULT_CONFIG_PATH;
use super::types::Config;
use crate::error::ClipsyncError;

/// Get the default config path (~/.clipsync/config.json)
pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).as_ref())
}

/// Load configuration from `path`, or ~/.clipsync/config.json when `None`.
///
/// Returns Config::default() if the file is missing or cannot be parsed.
#[instrument(name = "load_config")]
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return Config::default();
    }

    match read_config(&config_path) {
        Ok(config) => {
            info!(
                path = %config_path.display(),
                max_history_size = config.get_max_history_size(),
                poll_interval_ms = config.poll_interval_ms,
                "Successfully loaded config"
            );
            config
        }
        Err(e) => {
            warn!(
                path = %config_path.display(),
                error = %e,
                "Failed to load config, using defaults"
            );
            Config::default()
        }
    }
}

/// Read and parse a config file, surfacing the failure reason
pub fn read_config(path: &Path) -> Result<Config, ClipsyncError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ClipsyncError::io(path.display(), e))?;

    serde_json::from_str::<Config>(&content).map_err(|e| {
        let hint = if e.to_string().contains("invalid type") {
            " (numbers must not be quoted, e.g. \"maxHistorySize\": 50)"
        } else {
            ""
        };
        ClipsyncError::Config(format!("{}{}", e, hint))
    })
}
