//! Error envelope for responses produced by tower layers.
//!
//! The timeout and body-limit layers answer with bare `408` / `413` bodies.
//! These are rewritten into the same `{"error": {...}}` envelope handlers use:
//!
//! ```text
//! 408 → EINTERNAL "request timed out"
//! 413 → EINVALID  "request body too large"
//! ```

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::Response,
};

use crate::error::{error_response, EINTERNAL, EINVALID};

/// Replace non-JSON `408` and `413` responses with the error envelope.
pub async fn envelope_rejections(response: Response) -> Response {
    if is_json(&response) {
        return response;
    }
    match response.status() {
        StatusCode::REQUEST_TIMEOUT => {
            tracing::warn!("Request timed out");
            error_response(StatusCode::REQUEST_TIMEOUT, EINTERNAL, "request timed out")
        }
        StatusCode::PAYLOAD_TOO_LARGE => {
            error_response(StatusCode::PAYLOAD_TOO_LARGE, EINVALID, "request body too large")
        }
        _ => response,
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::{body::Body, http::Request, middleware, routing::post, Router};
    use tower::ServiceExt;
    use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

    use crate::error::ErrorEnvelope;

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_millis(200)).await;
        "late"
    }

    async fn echo(body: String) -> String {
        body
    }

    fn router() -> Router {
        Router::new()
            .route("/slow", post(slow))
            .route("/echo", post(echo))
            .layer(RequestBodyLimitLayer::new(8))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_millis(20),
            ))
            .layer(middleware::map_response(envelope_rejections))
    }

    async fn call(uri: &str, body: &'static str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-length", body.len())
            .body(Body::from(body))
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_timeout_uses_envelope() {
        let (status, body) = call("/slow", "").await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.error.code, EINTERNAL);
    }

    #[tokio::test]
    async fn test_oversized_body_uses_envelope() {
        let (status, body) = call("/echo", "far more than eight bytes").await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.error.code, EINVALID);
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let (status, body) = call("/echo", "hi").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"hi");
    }
}
