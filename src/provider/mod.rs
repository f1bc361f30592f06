//! Generative model providers.
//!
//! The gateway talks to the model through [`CodeModel`], which keeps the
//! HTTP client behind a seam that tests can replace with a fake.

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::{GeminiConfig, GeminiModel};

/// Errors raised while obtaining a completion from a provider.
///
/// The `Display` text is what callers see as `details`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("GEMINI_API_KEY is not set; cannot call the Gemini API")]
    MissingApiKey,

    #[error("{0}")]
    Request(String),

    #[error("Gemini API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse Gemini response: {0}")]
    Decode(String),

    #[error("Text not available: {0}")]
    Blocked(String),
}

/// A text-in, text-out generative model.
#[async_trait]
pub trait CodeModel: Send + Sync {
    /// Model identifier, for logging.
    fn name(&self) -> &str;

    /// Send a single prompt and return the full completion text.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}
