//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection (net)
//!     → server.rs (Axum router, middleware stack)
//!     → request.rs (request ID, trace span)
//!     → middleware/rejection.rs (408/413 → error envelope)
//!     → middleware/guard.rs (panic → 500 EINTERNAL)
//!     → login.rs            POST /v1/auth/login
//!     → middleware/auth.rs  bearer check for /v1/city/*
//!     → cities.rs           city CRUD
//!     → error envelope or JSON body back to the client
//! ```

pub mod cities;
pub mod login;
pub mod middleware;
pub mod request;
pub mod server;

pub use middleware::auth::extract_bearer;
pub use request::X_REQUEST_ID;
pub use server::{build_router, AppState};
