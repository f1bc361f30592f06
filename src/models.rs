//! Data models for the analysis gateway.
//!
//! This module contains the request, result and error payloads exchanged
//! over `POST /api/analyze`. Nothing here outlives a single request.

use serde::{Deserialize, Serialize};

/// Error message returned when `code` or `language` is absent.
pub const MISSING_INPUT_MESSAGE: &str = "Code and language are required.";

/// Error message returned when the model provider call fails.
pub const PROVIDER_FAILURE_MESSAGE: &str = "Failed to generate content. Check API key or model.";

/// Error message returned when the body exceeds the request size limit.
pub const BODY_TOO_LARGE_MESSAGE: &str = "Request body is too large.";

/// Raw JSON body of an analysis request.
///
/// Both fields are optional at this stage so that absence can be reported
/// as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// A validated analysis request: both fields are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Source code to analyze, passed through unmodified.
    pub code: String,
    /// Declared language identifier (not checked against any list).
    pub language: String,
}

/// Successful analysis: the model's text, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub output: String,
}

/// JSON error payload. `details` is only present for provider failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
