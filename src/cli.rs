//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and environment fallbacks.

use clap::Parser;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

/// CodeHelper - LLM-powered code analysis gateway
///
/// Serves `POST /api/analyze`, which sends a code snippet to Gemini and
/// returns a short report: purpose, issues, complexity, optimization tip.
///
/// Examples:
///   codehelper
///   codehelper --port 8080 --model gemini-2.5-flash
///   GEMINI_API_KEY=... codehelper --verbose
///   codehelper --init-config
#[derive(Parser, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Address to bind (default: 0.0.0.0)
    #[arg(long, value_name = "ADDR")]
    pub host: Option<IpAddr>,

    /// Port to bind (default: 5000)
    #[arg(short, long, value_name = "PORT", env = "PORT")]
    pub port: Option<u16>,

    /// Gemini API key
    #[arg(long, value_name = "KEY", env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model used for every analysis (default: gemini-2.5-flash)
    #[arg(short, long, value_name = "MODEL", env = "CODEHELPER_MODEL")]
    pub model: Option<String>,

    /// Gemini API base URL
    #[arg(long, value_name = "URL", env = "GEMINI_BASE_URL")]
    pub base_url: Option<String>,

    /// Provider request timeout in seconds
    ///
    /// Not set by default: a request waits as long as the provider takes.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .codehelper.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .codehelper.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

// Hand-written so the API key never reaches the logs.
impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("config", &self.config)
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .field("init_config", &self.init_config)
            .finish()
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.port == Some(0) {
            return Err("Port must be between 1 and 65535".to_string());
        }

        if let Some(ref url) = self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
