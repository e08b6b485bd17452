//! Supervised serve tasks.
//!
//! Every listener's serve loop runs on its own Tokio task. The task reports
//! how it ended through a watch channel, so the owner can notice a listener
//! that died after `open` returned instead of silently serving nothing.
//!
//! ```text
//! Running ──(close / graceful drain)──▶ Stopped
//!    └─────(accept loop error)─────────▶ Failed(reason)
//! ```

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum_server::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::net::listener::ListenerError;

/// Extra time allowed past the drain deadline for the task to wind down.
const CLOSE_GRACE: Duration = Duration::from_millis(250);

/// Observable state of a serve loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeState {
    Running,
    Stopped,
    Failed(String),
}

impl ServeState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ServeState::Running)
    }
}

/// Bind a TCP listener synchronously so failures surface to the caller.
///
/// A leading `:` means all interfaces (`":8080"` → `"0.0.0.0:8080"`).
pub async fn bind(address: &str) -> Result<std::net::TcpListener, ListenerError> {
    let address = normalize_bind_address(address);
    let bind_err = |source: io::Error| ListenerError::Bind {
        address: address.clone(),
        source,
    };

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(bind_err)?;
    // into_std keeps the socket non-blocking, which axum-server expects.
    listener.into_std().map_err(bind_err)
}

pub fn normalize_bind_address(address: &str) -> String {
    if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_string()
    }
}

/// A running serve loop plus the handle that stops it.
pub struct ServeTask {
    name: &'static str,
    local_addr: SocketAddr,
    handle: Handle,
    task: Option<JoinHandle<()>>,
    state: watch::Receiver<ServeState>,
}

impl ServeTask {
    /// Spawn `serve` and start tracking it.
    pub fn spawn<F>(name: &'static str, local_addr: SocketAddr, handle: Handle, serve: F) -> Self
    where
        F: Future<Output = io::Result<()>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(ServeState::Running);

        let task = tokio::spawn(async move {
            let outcome = match serve.await {
                Ok(()) => {
                    tracing::info!(server = name, "Server stopped");
                    ServeState::Stopped
                }
                Err(e) => {
                    tracing::error!(server = name, error = %e, "Server terminated with error");
                    ServeState::Failed(e.to_string())
                }
            };
            tx.send_replace(outcome);
        });

        Self {
            name,
            local_addr,
            handle,
            task: Some(task),
            state: rx,
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> watch::Receiver<ServeState> {
        self.state.clone()
    }

    /// Resolve once the serve loop has ended, with how it ended.
    pub async fn terminated(&self) -> ServeState {
        let mut rx = self.state.clone();
        let state = match rx.wait_for(ServeState::is_terminal).await {
            Ok(state) => state.clone(),
            // Sender dropped without a verdict: the task itself panicked.
            Err(_) => ServeState::Failed(format!("{} serve task aborted", self.name)),
        };
        state
    }

    /// Stop accepting, drain for up to `timeout`, then force-close.
    pub async fn close(&mut self, timeout: Duration) -> Result<(), ListenerError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };

        tracing::info!(
            server = self.name,
            address = %self.local_addr,
            active_connections = self.handle.connection_count(),
            timeout_ms = timeout.as_millis() as u64,
            "Graceful shutdown started"
        );
        self.handle.graceful_shutdown(Some(timeout));

        let abort = task.abort_handle();
        match tokio::time::timeout(timeout + CLOSE_GRACE, task).await {
            Ok(_) => Ok(()),
            Err(_) => {
                abort.abort();
                tracing::warn!(server = self.name, "Serve task did not stop in time, aborted");
                Err(ListenerError::ShutdownTimeout(timeout))
            }
        }
    }
}

impl Drop for ServeTask {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.handle.shutdown();
        }
    }
}

impl std::fmt::Debug for ServeTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServeTask")
            .field("name", &self.name)
            .field("local_addr", &self.local_addr)
            .field("state", &*self.state.borrow())
            .finish()
    }
}
