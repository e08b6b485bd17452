//! City API Library
//!
//! A small city catalogue served over HTTP(S), with JWT-gated writes.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net (ApiServer: TCP or ACME TLS)
//!                        │
//!                        ▼
//!                     http (router, request ID, tracing, metrics,
//!                        │  security headers, timeout, body limit,
//!                        │  panic guard)
//!                        ├──▶ /v1/auth/login ──▶ auth::AuthFlow
//!                        │                        ├─ UserRegistry
//!                        │                        └─ TokenService (JWT)
//!                        └──▶ /v1/city/* ──▶ require_token ──▶ city::CityService
//!
//!     net::RedirectServer (TLS mode): :80 ──302──▶ https://{domain}{path}
//! ```

pub mod auth;
pub mod city;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::AppConfig;
pub use error::AppError;
pub use http::{build_router, AppState};
pub use lifecycle::Application;
pub use net::{ApiServer, RedirectServer};
