//! Application error taxonomy and the JSON error envelope.
//!
//! Every component-level failure ends up as an [`AppError`]. The HTTP boundary
//! maps each variant to a stable code and status without looking at message
//! text:
//!
//! ```text
//! InvalidArgument → 400 EINVALID
//! NotFound        → 404 ENOTFOUND
//! Unauthorized    → 401 EUNAUTHORIZED
//! InvalidToken    → 401 ETOKENINVALID
//! ExpiredToken    → 401 ETOKENEXPIRED
//! Internal        → 500 EINTERNAL   (details logged, never sent)
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EINVALID: &str = "EINVALID";
pub const ENOTFOUND: &str = "ENOTFOUND";
pub const EUNAUTHORIZED: &str = "EUNAUTHORIZED";
pub const ETOKENINVALID: &str = "ETOKENINVALID";
pub const ETOKENEXPIRED: &str = "ETOKENEXPIRED";
pub const EINTERNAL: &str = "EINTERNAL";

/// Message sent to clients in place of internal fault details.
pub const INTERNAL_MESSAGE: &str = "internal error";

/// Classified application failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed or missing input. The caller must resubmit.
    #[error("{0}")]
    InvalidArgument(String),

    /// No such identity or resource.
    #[error("{0}")]
    NotFound(String),

    /// Credential mismatch or missing credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Presented token is malformed or its signature does not verify.
    #[error("invalid token")]
    InvalidToken,

    /// Presented token is past its expiry.
    #[error("token expired")]
    ExpiredToken,

    /// Unexpected fault (signing failure, registry corruption, panics).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => EINVALID,
            AppError::NotFound(_) => ENOTFOUND,
            AppError::Unauthorized(_) => EUNAUTHORIZED,
            AppError::InvalidToken => ETOKENINVALID,
            AppError::ExpiredToken => ETOKENEXPIRED,
            AppError::Internal(_) => EINTERNAL,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) | AppError::InvalidToken | AppError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a client.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

/// Build the envelope response for a code and status directly.
///
/// Used by layers that never see an [`AppError`] (panic recovery).
pub fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(ErrorEnvelope::new(code, message))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Internal error");
        }
        error_response(self.status(), self.code(), &self.public_message())
    }
}
