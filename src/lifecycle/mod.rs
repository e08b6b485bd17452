//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Registry, tokens, cities → Router → ApiServer (+ RedirectServer)
//!
//! Run:
//!     Signal received (signals.rs) or serve task ended → Shutdown
//!
//! Shutdown:
//!     Stop accepting → Drain in-flight requests (bounded) → Force-close
//! ```
//!
//! # Design Decisions
//! - Ordered startup: state first, listeners last (traffic only when ready)
//! - Redirect listener failure is logged, not fatal
//! - Shutdown has a timeout: forced close after the deadline

pub mod signals;
pub mod startup;

pub use startup::{Application, StartupError};
