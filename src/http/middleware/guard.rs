//! Fault isolation around request handlers.
//!
//! A panic inside a handler is caught at this boundary and turned into a
//! generic `500 EINTERNAL` response. The connection task survives, the accept
//! loop never sees the fault, and concurrent requests are unaffected.

use std::any::Any;

use axum::{http::StatusCode, response::Response};
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::{error_response, EINTERNAL, INTERNAL_MESSAGE};

pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Layer converting handler panics into internal-error responses.
pub fn layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(recover as PanicHandler)
}

fn recover(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "non-string panic payload"
    };

    tracing::error!(panic = %detail, "Handler panicked; request recovered");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, EINTERNAL, INTERNAL_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    use crate::error::ErrorEnvelope;

    async fn boom() -> &'static str {
        panic!("secret-detail exploded")
    }

    fn router() -> Router {
        Router::new()
            .route("/boom", get(boom))
            .route("/ok", get(|| async { "fine" }))
            .layer(layer())
    }

    async fn call(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let (status, body) = call(router(), "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.error.code, EINTERNAL);
        assert_eq!(envelope.error.message, INTERNAL_MESSAGE);
        assert!(!String::from_utf8_lossy(&body).contains("secret-detail"));
    }

    #[tokio::test]
    async fn test_router_keeps_serving_after_panic() {
        let router = router();
        let (status, _) = call(router.clone(), "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, body) = call(router, "/ok").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"fine");
    }
}
