//! Configuration types and loading
//!
//! Config precedence: env vars > config file > defaults. The file is
//! optional — a bare environment with nothing set talks to the default
//! local backend, matching the shell's development defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    /// Application title, composed into page titles by the routing layer.
    pub app_title: String,
    /// Enables request/response debug logging in the API client.
    pub dev_mode: bool,
    /// Where the session (tokens + cached profile) is persisted.
    pub session_file: PathBuf,
}

/// Backend endpoint settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            app_title: "Admin Console".into(),
            dev_mode: false,
            session_file: PathBuf::from("session.json"),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file (if present), then overlay
    /// environment variables: API_BASE_URL, APP_TITLE, DEV_MODE,
    /// SESSION_FILE.
    pub fn load(path: &Path) -> common::Result<Self> {
        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            Config::default()
        };

        if let Ok(url) = std::env::var("API_BASE_URL") {
            config.api.base_url = url;
        }
        if let Ok(title) = std::env::var("APP_TITLE") {
            config.app_title = title;
        }
        if let Ok(dev) = std::env::var("DEV_MODE") {
            config.dev_mode = matches!(dev.as_str(), "1" | "true" | "yes");
        }
        if let Ok(file) = std::env::var("SESSION_FILE") {
            config.session_file = PathBuf::from(file);
        }

        if !config.api.base_url.starts_with("http://")
            && !config.api.base_url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "api.base_url must start with http:// or https://, got: {}",
                config.api.base_url
            )));
        }

        if config.api.timeout_secs == 0 {
            return Err(common::Error::Config(
                "api.timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("admin-shell.toml")
    }
}
