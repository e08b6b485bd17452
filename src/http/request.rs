//! Request identification.
//!
//! Every request gets an `x-request-id` (UUID v4) as early as possible, unless
//! the client already sent one; the same value is echoed on the response.

use axum::{http::HeaderMap, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request id of an incoming request, `"unknown"` when absent.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Wrap `router` with request-id assignment, tracing and propagation.
pub fn with_request_tracing(router: Router) -> Router {
    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_request_id_is_assigned_and_echoed() {
        let router = with_request_tracing(Router::new().route(
            "/",
            get(|headers: HeaderMap| async move { request_id(&headers).to_string() }),
        ));

        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let echoed = response.headers()[X_REQUEST_ID].to_str().unwrap().to_string();
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(echoed.len(), 36);
        assert_eq!(body, echoed.as_bytes());
    }

    #[tokio::test]
    async fn test_client_request_id_is_kept() {
        let router = with_request_tracing(Router::new().route("/", get(|| async { "" })));
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(X_REQUEST_ID, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "abc-123");
    }

    #[test]
    fn test_missing_request_id_is_unknown() {
        assert_eq!(request_id(&HeaderMap::new()), "unknown");
    }
}
