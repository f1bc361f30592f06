//! Gemini `generateContent` client.
//!
//! Sends a single user prompt and returns the text of the first candidate.
//! Non-streaming; one HTTP request per call, no retries.

use crate::provider::{CodeModel, ProviderError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Settings needed to build a [`GeminiModel`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model_name: String,
    /// `None` builds a client that fails on every call.
    pub api_key: Option<String>,
    /// `None` leaves the transport default in place.
    pub timeout_seconds: Option<u64>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model_name: "gemini-2.5-flash".to_string(),
            api_key: None,
            timeout_seconds: None,
        }
    }
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Shared, immutable Gemini client.
pub struct GeminiModel {
    http_client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiModel {
    /// Build the client. A missing API key is not an error here.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model_name
        )
    }
}

#[async_trait]
impl CodeModel for GeminiModel {
    fn name(&self) -> &str {
        &self.config.model_name
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey)?;

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let url = self.endpoint();
        debug!("Sending generateContent request to {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Request(timeout_message(self.config.timeout_seconds))
                } else if e.is_connect() {
                    ProviderError::Request(format!(
                        "Cannot connect to Gemini at {}",
                        self.config.base_url
                    ))
                } else {
                    ProviderError::Request(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        extract_text(&body)
    }
}

/// Pull the human-readable message out of a Gemini error body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    }
}

/// Finish reasons that mean the candidate text was withheld.
const BLOCKED_FINISH_REASONS: [&str; 6] = [
    "SAFETY",
    "RECITATION",
    "LANGUAGE",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

fn timeout_message(timeout_seconds: Option<u64>) -> String {
    match timeout_seconds {
        Some(secs) => format!("Request timed out after {}s", secs),
        None => "Request timed out".to_string(),
    }
}

/// Concatenate the text parts of the first candidate.
///
/// A candidate without text parts (e.g. `MAX_TOKENS`) and a response without
/// candidates both yield an empty string; only blocked prompts and blocked
/// finish reasons are errors.
fn extract_text(body: &str) -> Result<String, ProviderError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;

    if let Some(candidate) = parsed.candidates.into_iter().next() {
        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .filter(|r| BLOCKED_FINISH_REASONS.contains(r))
        {
            return Err(ProviderError::Blocked(format!(
                "Candidate was blocked due to {}",
                reason
            )));
        }

        let text = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default();
        return Ok(text);
    }

    if let Some(reason) = parsed
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(ProviderError::Blocked(format!(
            "Response was blocked due to {}",
            reason
        )));
    }

    Ok(String::new())
}
