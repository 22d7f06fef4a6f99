//! Engine Configuration
//!
//! Provides configuration for the HTTP API client: server URL and bearer
//! token. Values come from, in order of precedence, the builder, the
//! `CAMPUSBOARD_API_URL` environment variable, an optional TOML config file,
//! and a localhost default.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Environment variable overriding the server URL
const API_URL_ENV: &str = "CAMPUSBOARD_API_URL";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// On-disk configuration file shape
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    server_url: Option<String>,
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    server_url: String,
    token: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let server_url =
            std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self {
            server_url,
            token: None,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EngineConfigBuilder
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Load configuration, preferring the environment variable over the
    /// user config file (`<config dir>/campusboard/config.toml`).
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            return Self::builder().server_url(url).build();
        }
        if let Some(path) = Self::config_file_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&raw)?;
        let mut builder = Self::builder();
        if let Some(url) = file.server_url {
            builder = builder.server_url(url);
        }
        builder.build()
    }

    /// Location of the user config file, when a config directory exists
    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("campusboard").join("config.toml"))
    }

    /// Set the bearer token
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Get the bearer token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Clear the token (sign-out)
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Base server URL
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), path)
    }
}

/// Builder for EngineConfig
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    server_url: Option<String>,
    token: Option<String>,
}

impl EngineConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the bearer token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let server_url = self
            .server_url
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(server_url));
        }
        Ok(EngineConfig {
            server_url,
            token: self.token,
        })
    }
}
