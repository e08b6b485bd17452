//! API listener lifecycle.
//!
//! # Responsibilities
//! - Bind exactly one listener per server instance
//! - Plain TCP, or ACME-provisioned TLS when a domain is configured
//! - Serve the router on a supervised background task
//! - Report the effective port, scheme and URL
//! - Bounded graceful shutdown

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::ListenerConfig;
use crate::net::supervisor::{self, ServeState, ServeTask};
use crate::net::tls;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Failed to bind to address.
    Bind { address: String, source: io::Error },
    /// TLS could not be set up.
    Tls(String),
    /// In-flight work did not finish within the shutdown deadline.
    ShutdownTimeout(Duration),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Bind { address, source } => {
                write!(f, "Failed to bind {}: {}", address, source)
            }
            ListenerError::Tls(e) => write!(f, "TLS setup failed: {}", e),
            ListenerError::ShutdownTimeout(t) => {
                write!(f, "Shutdown did not complete within {:?}", t)
            }
        }
    }
}

impl std::error::Error for ListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListenerError::Bind { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The main API server.
///
/// `open` returns as soon as the socket is bound; serving happens on a
/// background task whose fate is observable through [`ApiServer::state`].
pub struct ApiServer {
    domain: Option<String>,
    serve: ServeTask,
    acme: Option<JoinHandle<()>>,
}

impl ApiServer {
    /// Bind according to `config` and start serving `app`.
    pub async fn open(config: &ListenerConfig, app: Router) -> Result<Self, ListenerError> {
        let listener = supervisor::bind(&config.bind_address).await?;
        let local_addr = listener.local_addr().map_err(|source| ListenerError::Bind {
            address: config.bind_address.clone(),
            source,
        })?;

        let handle = Handle::new();
        let make_service = app.into_make_service();

        let (serve, acme) = match &config.domain {
            Some(domain) => {
                let (acceptor, acme_task) = tls::acme_acceptor(domain, &config.acme)?;
                let server = axum_server::from_tcp(listener)
                    .acceptor(acceptor)
                    .handle(handle.clone());
                let serve = ServeTask::spawn("api", local_addr, handle, server.serve(make_service));
                (serve, Some(acme_task))
            }
            None => {
                let server = axum_server::from_tcp(listener).handle(handle.clone());
                let serve = ServeTask::spawn("api", local_addr, handle, server.serve(make_service));
                (serve, None)
            }
        };

        let server = Self {
            domain: config.domain.clone(),
            serve,
            acme,
        };

        tracing::info!(
            address = %local_addr,
            scheme = server.scheme(),
            domain = ?server.domain,
            "API server listening"
        );
        Ok(server)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.serve.local_addr()
    }

    /// Bound port; differs from the configured one when it asked for port 0.
    pub fn port(&self) -> u16 {
        self.local_addr().port()
    }

    pub fn use_tls(&self) -> bool {
        self.domain.is_some()
    }

    pub fn scheme(&self) -> &'static str {
        if self.use_tls() {
            "https"
        } else {
            "http"
        }
    }

    /// Base URL on localhost, omitting the port when it is the scheme default.
    pub fn url(&self) -> String {
        format_url(self.scheme(), "localhost", self.port())
    }

    pub fn state(&self) -> watch::Receiver<ServeState> {
        self.serve.state()
    }

    /// Resolve when the serve loop ends, for whatever reason.
    pub async fn terminated(&self) -> ServeState {
        self.serve.terminated().await
    }

    /// Stop accepting, give in-flight requests up to `timeout`, then force-close.
    pub async fn close(&mut self, timeout: Duration) -> Result<(), ListenerError> {
        let result = self.serve.close(timeout).await;
        if let Some(acme) = self.acme.take() {
            acme.abort();
        }
        result
    }
}

impl std::fmt::Debug for ApiServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiServer")
            .field("domain", &self.domain)
            .field("serve", &self.serve)
            .finish_non_exhaustive()
    }
}

pub fn format_url(scheme: &str, host: &str, port: u16) -> String {
    if (scheme == "http" && port == 80) || (scheme == "https" && port == 443) {
        format!("{scheme}://{host}")
    } else {
        format!("{scheme}://{host}:{port}")
    }
}
