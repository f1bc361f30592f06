//! HTTP surface of the gateway.
//!
//! Routes:
//! - `GET /` plain-text liveness message
//! - `POST /api/analyze` code analysis
//!
//! CORS is fully permissive; any frontend may call the gateway.

use crate::gateway::{Gateway, GatewayError};
use crate::models::{AnalysisResult, AnalyzeBody};
use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Body of `GET /`.
pub const LIVENESS_MESSAGE: &str = "AI Backend running successfully with Gemini API!";

/// Build the application router.
pub fn router(gateway: Gateway) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/api/analyze", post(analyze))
        .with_state(gateway)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

async fn analyze(
    State(gateway): State<Gateway>,
    payload: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Json<AnalysisResult>, GatewayError> {
    let Json(body) = payload.map_err(reject_body)?;

    gateway.handle(body).await.map(Json)
}

/// Map a body rejection onto a gateway error.
///
/// Oversized bodies get their own status; any other body we cannot read has
/// no fields, so it is reported as missing input.
fn reject_body(rejection: JsonRejection) -> GatewayError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Rejected analysis body: {}", rejection.body_text());
        GatewayError::BodyTooLarge
    } else {
        debug!("Unreadable analysis body: {}", rejection.body_text());
        GatewayError::MissingInput
    }
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, gateway: Gateway) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Backend running on http://{}", listener.local_addr()?);

    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining in-flight requests...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::tests::FakeModel;
    use crate::models::{
        ErrorBody, BODY_TOO_LARGE_MESSAGE, MISSING_INPUT_MESSAGE, PROVIDER_FAILURE_MESSAGE,
    };
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const STUB_OUTPUT: &str = "Purpose: prints hi\nIssues / Bugs: None detected.\nComplexity: O(1) time, O(1) space\nOptimization Tip: none";

    fn analyze_request(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_liveness() {
        let app = router(Gateway::new(FakeModel::replying("")));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), LIVENESS_MESSAGE);
    }

    #[tokio::test]
    async fn test_analyze_success_returns_exact_output() {
        let model = FakeModel::replying(STUB_OUTPUT);
        let app = router(Gateway::new(model.clone()));
        let payload = json!({ "code": "print('hi')", "language": "python" }).to_string();

        let (status, body) = send(app, analyze_request(payload)).await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "output": STUB_OUTPUT }));
        assert_eq!(model.calls(), 1);
        assert!(model.prompts()[0].contains("print('hi')"));
    }

    #[tokio::test]
    async fn test_analyze_missing_fields() {
        for payload in [
            json!({ "language": "python" }),
            json!({ "code": "x = 1" }),
            json!({ "code": null, "language": "python" }),
            json!({}),
        ] {
            let model = FakeModel::replying("unused");
            let app = router(Gateway::new(model.clone()));

            let (status, body) = send(app, analyze_request(payload.to_string())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);

            let json: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json, json!({ "error": MISSING_INPUT_MESSAGE }));
            assert_eq!(model.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_analyze_unreadable_bodies_are_missing_input() {
        let bodies = [
            "{not json".to_string(),
            json!(["code", "language"]).to_string(),
            json!({ "code": 42, "language": "python" }).to_string(),
        ];
        for payload in bodies {
            let model = FakeModel::replying("unused");
            let app = router(Gateway::new(model.clone()));

            let (status, body) = send(app, analyze_request(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let err: ErrorBody = serde_json::from_slice(&body).unwrap();
            assert_eq!(err.error, MISSING_INPUT_MESSAGE);
            assert_eq!(model.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_analyze_without_json_content_type() {
        let model = FakeModel::replying("unused");
        let app = router(Gateway::new(model.clone()));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/analyze")
            .body(Body::from(r#"{"code":"x","language":"go"}"#))
            .unwrap();

        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_oversized_body() {
        let model = FakeModel::replying("unused");
        let app = router(Gateway::new(model.clone()));
        let code = "x".repeat(3 * 1024 * 1024);
        let payload = json!({ "code": code, "language": "python" }).to_string();

        let (status, body) = send(app, analyze_request(payload)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "error": BODY_TOO_LARGE_MESSAGE }));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_empty_completion_is_success() {
        let app = router(Gateway::new(FakeModel::replying("")));
        let payload = json!({ "code": "pass", "language": "python" }).to_string();

        let (status, body) = send(app, analyze_request(payload)).await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "output": "" }));
    }

    #[tokio::test]
    async fn test_analyze_provider_failure() {
        let app = router(Gateway::new(FakeModel::failing("API key not valid")));
        let payload = json!({ "code": "int main() {}", "language": "cpp" }).to_string();

        let (status, body) = send(app, analyze_request(payload)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            json!({ "error": PROVIDER_FAILURE_MESSAGE, "details": "API key not valid" })
        );
        assert!(json.get("output").is_none());
    }

    #[tokio::test]
    async fn test_analyze_empty_code_reaches_provider() {
        let model = FakeModel::replying("Purpose: empty");
        let app = router(Gateway::new(model.clone()));
        let payload = json!({ "code": "", "language": "python" }).to_string();

        let (status, _) = send(app, analyze_request(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = router(Gateway::new(FakeModel::replying("")));
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/analyze")
            .header(header::ORIGIN, "http://frontend.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }
}
