//! Configuration file support
//!
//! Loads config from ~/.minidb/config.toml. Values resolve as
//! CLI args > env vars (handled by clap) > config file > defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::query::SelectorPolicy;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_INDEX: &str = "-";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Env var the web front-end used for the same setting
pub const LEGACY_BASE_URL_ENV: &str = "VITE_API_BASE_URL";

/// Contents of config.toml
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Base URL of the parser/database services
    pub api_base_url: Option<String>,

    /// Index engine selected at startup
    pub index: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Reject index names outside the known set
    pub strict_index: Option<bool>,
}

impl Config {
    /// Load config from ~/.minidb/config.toml
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub index: Option<String>,
    pub timeout_secs: Option<u64>,
    pub strict_index: bool,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub index: String,
    pub timeout: Duration,
    pub policy: SelectorPolicy,
}

impl Settings {
    /// Merge overrides, the legacy env var and the config file
    pub fn resolve(overrides: Overrides, config: Config, legacy_base_url: Option<String>) -> Self {
        let api_base_url = overrides
            .api_base_url
            .or(legacy_base_url)
            .or(config.api_base_url)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let index = overrides
            .index
            .or(config.index)
            .unwrap_or_else(|| DEFAULT_INDEX.to_string());

        let timeout_secs = overrides
            .timeout_secs
            .or(config.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let strict = overrides.strict_index || config.strict_index.unwrap_or(false);

        Self {
            api_base_url,
            index,
            timeout: Duration::from_secs(timeout_secs),
            policy: SelectorPolicy::from_strict(strict),
        }
    }
}

/// Directory for config, .env and history
pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".minidb")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    home_dir().join("config.toml")
}

/// Load .env from ~/.minidb/.env, falling back to the current dir
pub fn load_dotenv() {
    let env_path = home_dir().join(".env");
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    } else {
        let _ = dotenvy::dotenv();
    }
}
