//! Plain-HTTP companion listener that sends everything to HTTPS.
//!
//! Runs only in TLS mode, on its own socket and task. Shares nothing with
//! the API server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use axum_server::Handle;
use tokio::sync::watch;

use crate::net::listener::ListenerError;
use crate::net::supervisor::{self, ServeState, ServeTask};

/// Router answering every request with `302 Found` to `https://{domain}{path}`.
pub fn redirect_router(domain: &str) -> Router {
    let domain: Arc<str> = Arc::from(domain);
    Router::new().fallback(redirect_to_https).with_state(domain)
}

async fn redirect_to_https(State(domain): State<Arc<str>>, uri: Uri) -> Response {
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let location = format!("https://{domain}{path}");
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// HTTP→HTTPS redirect listener.
#[derive(Debug)]
pub struct RedirectServer {
    serve: ServeTask,
}

impl RedirectServer {
    pub async fn open(address: &str, domain: &str) -> Result<Self, ListenerError> {
        let listener = supervisor::bind(address).await?;
        let local_addr = listener.local_addr().map_err(|source| ListenerError::Bind {
            address: address.to_string(),
            source,
        })?;

        let handle = Handle::new();
        let server = axum_server::from_tcp(listener).handle(handle.clone());
        let serve = ServeTask::spawn(
            "redirect",
            local_addr,
            handle,
            server.serve(redirect_router(domain).into_make_service()),
        );

        tracing::info!(address = %local_addr, domain = %domain, "Redirect server listening");
        Ok(Self { serve })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.serve.local_addr()
    }

    pub fn state(&self) -> watch::Receiver<ServeState> {
        self.serve.state()
    }

    pub async fn terminated(&self) -> ServeState {
        self.serve.terminated().await
    }

    pub async fn close(&mut self, timeout: Duration) -> Result<(), ListenerError> {
        self.serve.close(timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_redirect_keeps_path_and_query() {
        let response = redirect_router("api.example.com")
            .oneshot(
                Request::builder()
                    .uri("/v1/city/Napoli?verbose=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://api.example.com/v1/city/Napoli?verbose=1"
        );
    }

    #[tokio::test]
    async fn test_redirect_server_over_tcp() {
        let mut server = RedirectServer::open("127.0.0.1:0", "api.example.com")
            .await
            .unwrap();

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .unwrap();
        let response = client
            .post(format!("http://{}/v1/auth/login", server.local_addr()))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 302);
        assert_eq!(
            response.headers()["location"],
            "https://api.example.com/v1/auth/login"
        );

        server.close(Duration::from_secs(1)).await.unwrap();
        assert_eq!(server.terminated().await, ServeState::Stopped);
    }
}
