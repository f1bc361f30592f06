//! CodeHelper - AI-powered code analysis gateway
//!
//! An HTTP service that takes a code snippet and its language, asks
//! Gemini for a short structured review, and returns the text as JSON.
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Startup error (invalid arguments, config, bind failure, etc.)

mod cli;
mod config;
mod gateway;
mod models;
mod prompt;
mod provider;
mod server;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use gateway::Gateway;
use provider::GeminiModel;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up GEMINI_API_KEY, PORT, ... from .env before clap reads the environment
    let dotenv_path = dotenvy::dotenv().ok();

    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("CodeHelper v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = dotenv_path {
        debug!("Loaded environment from {}", path.display());
    }
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_server(args).await {
        error!("Server failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .codehelper.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to change the bind address, model, or timeout.");
    Ok(())
}

/// Initialize logging based on verbosity settings. `RUST_LOG` wins if set.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Build the gateway from configuration and serve until shutdown.
async fn run_server(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    if config.model.api_key.is_some() {
        info!("Gemini API key: set");
    } else {
        warn!("GEMINI_API_KEY is not set; every analysis will fail until it is configured");
    }

    // One client for the whole process, shared by every request
    let model = GeminiModel::new(config.gemini())?;
    let gateway = Gateway::new(Arc::new(model));

    info!("Model: {}", gateway.model_name());
    info!("Gemini API: {}", config.model.base_url);
    match config.model.timeout_seconds {
        Some(secs) => info!("Provider timeout: {}s", secs),
        None => debug!("No provider timeout configured"),
    }

    server::serve(config.bind_addr(), gateway).await
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
