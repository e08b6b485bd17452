//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig
//!     → supervisor.rs (synchronous bind, supervised serve task)
//!     → listener.rs (ApiServer: plain TCP or TLS, port/scheme/url, close)
//!     → tls.rs (ACME acceptor, certificate renewal task)
//!     → Hand off to the axum router
//!
//! TLS mode only:
//!     redirect.rs (port 80 → 302 https://domain/...)
//!
//! Serve task states:
//!     Running → Stopped | Failed
//! ```
//!
//! # Design Decisions
//! - Bind errors are returned from `open`; later faults are reported through
//!   a watch channel
//! - Shutdown is bounded: drain up to the timeout, then force-close
//! - TLS is optional and handled transparently

pub mod listener;
pub mod redirect;
pub mod supervisor;
pub mod tls;

pub use listener::{ApiServer, ListenerError};
pub use redirect::RedirectServer;
pub use supervisor::ServeState;
