//! The analysis gateway.
//!
//! Validates a request, builds the prompt, makes exactly one model call and
//! normalizes the outcome into either an [`AnalysisResult`] or a
//! [`GatewayError`].

use crate::models::{
    AnalysisRequest, AnalysisResult, AnalyzeBody, ErrorBody, BODY_TOO_LARGE_MESSAGE,
    MISSING_INPUT_MESSAGE, PROVIDER_FAILURE_MESSAGE,
};
use crate::prompt::build_prompt;
use crate::provider::CodeModel;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors returned to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// `code` or `language` was absent.
    #[error("Code and language are required.")]
    MissingInput,

    /// The body was over the size limit and was never read.
    #[error("Request body is too large.")]
    BodyTooLarge,

    /// The provider call failed; `details` is its message.
    #[error("Failed to generate content. Check API key or model.")]
    ProviderFailure { details: String },
}

impl GatewayError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingInput => StatusCode::BAD_REQUEST,
            GatewayError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::ProviderFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON payload for this error.
    pub fn body(&self) -> ErrorBody {
        match self {
            GatewayError::MissingInput => ErrorBody {
                error: MISSING_INPUT_MESSAGE.to_string(),
                details: None,
            },
            GatewayError::BodyTooLarge => ErrorBody {
                error: BODY_TOO_LARGE_MESSAGE.to_string(),
                details: None,
            },
            GatewayError::ProviderFailure { details } => ErrorBody {
                error: PROVIDER_FAILURE_MESSAGE.to_string(),
                details: Some(details.clone()),
            },
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl AnalyzeBody {
    /// Check that both fields are present.
    ///
    /// Only absence is rejected; an empty `code` string is forwarded.
    pub fn validate(self) -> Result<AnalysisRequest, GatewayError> {
        match (self.code, self.language) {
            (Some(code), Some(language)) => Ok(AnalysisRequest { code, language }),
            _ => Err(GatewayError::MissingInput),
        }
    }
}

/// Stateless gateway around a shared model handle.
#[derive(Clone)]
pub struct Gateway {
    model: Arc<dyn CodeModel>,
}

impl Gateway {
    pub fn new(model: Arc<dyn CodeModel>) -> Self {
        Self { model }
    }

    /// Name of the pinned model.
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Validate a raw body, then analyze it.
    pub async fn handle(&self, body: AnalyzeBody) -> Result<AnalysisResult, GatewayError> {
        let request = body.validate().inspect_err(|_| {
            debug!("Rejecting analysis request: missing code or language");
        })?;
        self.analyze(request).await
    }

    /// Run one analysis: build the prompt and make a single model call.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, GatewayError> {
        info!(
            language = %request.language,
            code_bytes = request.code.len(),
            model = self.model.name(),
            "Analyzing code"
        );

        let prompt = build_prompt(&request.language, &request.code);

        match self.model.generate(&prompt).await {
            Ok(output) => {
                debug!("Model returned {} bytes", output.len());
                Ok(AnalysisResult { output })
            }
            Err(e) => {
                error!("Gemini API error: {}", e);
                Err(GatewayError::ProviderFailure {
                    details: e.to_string(),
                })
            }
        }
    }
}
