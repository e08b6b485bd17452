//! Authentication and request admission.
//!
//! # Data Flow
//! ```text
//! POST /v1/auth/login
//!     → flow.rs (validate, look up, compare, issue)
//!     → registry.rs (identity by username, RwLock guarded)
//!     → token.rs (HS256 JWT exchange)
//!
//! Protected request
//!     → http::middleware::auth (bearer extraction)
//!     → token.rs (parse + expiry against clock.rs)
//! ```
//!
//! # Design Decisions
//! - Registry is an owned component shared through `Arc`, never a static
//! - Tokens are stateless; nothing is retained after issuance
//! - Token strategy sits behind the `TokenService` trait

pub mod clock;
pub mod flow;
pub mod registry;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use flow::AuthFlow;
pub use registry::{Identity, RegistryError, UserRegistry};
pub use token::{Claims, JwtTokenService, TokenError, TokenPair, TokenService};
