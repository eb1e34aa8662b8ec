//! Runtime configuration I/O operations.
//!
//! System directory detection and config loading that need runtime
//! dependencies (dirs, tracing).

use crate::config::{Config, ConfigError};
use std::path::{Path, PathBuf};

/// Directory name used under the platform config directory
const APP_DIR: &str = "folio";

/// Get the path to the user config file (`<config_dir>/folio/config.json`)
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
}

/// Default log file location (system temp dir)
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("{APP_DIR}.log"))
}

/// Resolve the effective configuration.
///
/// An explicit path must exist. Without one, the user config file is used
/// when present, otherwise built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        tracing::debug!("Loading config from {:?}", path);
        return Config::load_from_file(path);
    }

    match user_config_path() {
        Some(path) => load_if_present(&path),
        None => Ok(Config::default()),
    }
}

/// Load `path` if it exists, otherwise fall back to defaults
pub fn load_if_present(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        tracing::debug!("Loading user config from {:?}", path);
        Config::load_from_file(path)
    } else {
        tracing::debug!("No config at {:?}, using defaults", path);
        Ok(Config::default())
    }
}
