//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → headers.rs (nosniff, frame options, XSS protection)
//!     → headers.rs (CORS)
//! ```
//!
//! Request admission (bearer tokens) lives in `http::middleware::auth`;
//! request size limits in `http::server`.

pub mod headers;
