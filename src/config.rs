//! Configuration module for galleryd.

use serde::Deserialize;
use std::path::Path;

use crate::{GalleryError, Result};

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for the Web API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    3000
}

fn default_max_upload_size() -> u64 {
    10
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: Vec::new(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

impl WebConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }
}

/// Gallery storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one sub-directory per gallery.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Path to the JSON index document.
    #[serde(default = "default_index_path")]
    pub index_path: String,
    /// Run a reconciliation pass before serving requests.
    #[serde(default)]
    pub reconcile_on_startup: bool,
}

fn default_storage_root() -> String {
    "galleries".to_string()
}

fn default_index_path() -> String {
    "gallery.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            index_path: default_index_path(),
            reconcile_on_startup: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/galleryd.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Gallery storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GalleryError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| GalleryError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `GALLERYD_STORAGE_ROOT`: Override the gallery root directory
    /// - `GALLERYD_INDEX_PATH`: Override the index document path
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("GALLERYD_STORAGE_ROOT") {
            if !root.is_empty() {
                self.storage.root = root;
            }
        }
        if let Ok(index_path) = std::env::var("GALLERYD_INDEX_PATH") {
            if !index_path.is_empty() {
                self.storage.index_path = index_path;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.storage.root.trim().is_empty() {
            return Err(GalleryError::Config(
                "storage.root must not be empty".to_string(),
            ));
        }
        if self.storage.index_path.trim().is_empty() {
            return Err(GalleryError::Config(
                "storage.index_path must not be empty".to_string(),
            ));
        }
        if self.web.max_upload_size_mb == 0 {
            return Err(GalleryError::Config(
                "web.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
