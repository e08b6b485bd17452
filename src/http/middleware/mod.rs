//! Request middleware.
//!
//! - `guard.rs`: panic isolation around every handler
//! - `auth.rs`: bearer token admission for `/v1/city`
//! - `rejection.rs`: error envelope for timeout and body-limit rejections

pub mod auth;
pub mod guard;
pub mod rejection;
