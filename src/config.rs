//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.codehelper.toml` files.

use crate::provider::GeminiConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".codehelper.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Model provider settings.
    #[serde(default)]
    pub model: ModelConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    5000
}

/// Model provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Pinned model identifier.
    #[serde(default = "default_model")]
    pub name: String,

    /// Gemini API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Gemini API key. Usually supplied through `GEMINI_API_KEY` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds. Unset means no gateway timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            base_url: default_base_url(),
            api_key: None,
            timeout_seconds: None,
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.codehelper.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and the environment variables backing them) take
    /// precedence over config file settings. Only explicit values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(host) = args.host {
            self.server.host = host;
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref base_url) = args.base_url {
            self.model.base_url = base_url.clone();
        }
        if let Some(ref api_key) = args.api_key {
            self.model.api_key = Some(api_key.clone());
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = Some(timeout);
        }

        // An empty key is as good as none.
        if self.model.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.model.api_key = None;
        }
    }

    /// Socket address the server binds.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    /// Provider client settings.
    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            base_url: self.model.base_url.clone(),
            model_name: self.model.name.clone(),
            api_key: self.model.api_key.clone(),
            timeout_seconds: self.model.timeout_seconds,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
