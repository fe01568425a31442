//! User settings and defaults
//!
//! Manages run defaults stored in ~/.pgstorm/config.toml. Every field is
//! optional in the file; command-line flags override whatever is loaded here.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Number of worker slots
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Seconds between slot scans
    #[serde(default = "default_poll_delay")]
    pub poll_delay: f64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Print a marker for sessions that die before validation
    #[serde(default)]
    pub show_errors: bool,

    /// Seconds a session may run before it is abandoned
    #[serde(default)]
    pub session_timeout: Option<f64>,

    #[serde(default = "default_pass_marker")]
    pub pass_marker: char,

    #[serde(default = "default_fail_marker")]
    pub fail_marker: char,

    #[serde(default = "default_error_marker")]
    pub error_marker: char,
}

fn default_workers() -> usize {
    10
}

fn default_poll_delay() -> f64 {
    0.05
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_pass_marker() -> char {
    '.'
}

fn default_fail_marker() -> char {
    'E'
}

fn default_error_marker() -> char {
    'X'
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            poll_delay: default_poll_delay(),
            log_level: default_log_level(),
            show_errors: false,
            session_timeout: None,
            pass_marker: default_pass_marker(),
            fail_marker: default_fail_marker(),
            error_marker: default_error_marker(),
        }
    }
}

/// Get the config directory path (~/.pgstorm/)
pub fn config_dir() -> ConfigResult<PathBuf> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".pgstorm"))
}

/// Load settings from `path`, or from the default location when `None`.
///
/// A missing default file yields defaults; a missing explicit file is an error.
pub fn load_settings(path: Option<&Path>) -> ConfigResult<Settings> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound(p.display().to_string()));
            }
            p.to_path_buf()
        }
        None => {
            let p = config_dir()?.join("config.toml");
            if !p.exists() {
                return Ok(Settings::default());
            }
            p
        }
    };
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let settings: Settings = toml::from_str(&content)?;
    Ok(settings)
}

/// Convert fractional seconds into a `Duration`, rejecting negative and non-finite values
pub fn seconds(name: &str, value: f64) -> ConfigResult<Duration> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        ConfigError::Invalid(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, value
        ))
    })
}
