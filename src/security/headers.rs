//! Security response headers and CORS.
//!
//! - `X-Content-Type-Options: nosniff`
//! - `X-Frame-Options: SAMEORIGIN`
//! - `X-XSS-Protection: 1; mode=block`
//!
//! Headers a handler already set are left alone.

use axum::{
    http::{header, HeaderValue},
    Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer};

use crate::config::HttpConfig;

pub fn apply(router: Router, config: &HttpConfig) -> Router {
    let mut router = router;

    if config.security_headers {
        router = router
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("SAMEORIGIN"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_XSS_PROTECTION,
                HeaderValue::from_static("1; mode=block"),
            ));
    }

    if config.cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    async fn headers_for(config: HttpConfig) -> axum::http::HeaderMap {
        let router = apply(Router::new().route("/", get(|| async { "ok" })), &config);
        let request = Request::builder()
            .uri("/")
            .header(header::ORIGIN, "https://elsewhere.example")
            .body(Body::empty())
            .unwrap();
        router.oneshot(request).await.unwrap().headers().clone()
    }

    #[tokio::test]
    async fn test_security_headers_and_cors_enabled() {
        let headers = headers_for(HttpConfig::default()).await;
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        assert_eq!(headers[header::X_XSS_PROTECTION], "1; mode=block");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_layers_can_be_disabled() {
        let headers = headers_for(HttpConfig {
            security_headers: false,
            cors: false,
            ..HttpConfig::default()
        })
        .await;
        assert!(!headers.contains_key(header::X_FRAME_OPTIONS));
        assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
