//! Bearer token admission for protected routes.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::auth::TokenError;
use crate::error::AppError;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Token from an `Authorization` header.
///
/// The value is split on single spaces and must yield exactly two parts;
/// anything else counts as no credential.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [_, token] if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Reject requests without a valid token; attach the verified
/// [`Claims`](crate::auth::Claims) to the request otherwise.
pub async fn require_token(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let rid = request_id(request.headers()).to_string();

    let Some(token) = extract_bearer(request.headers()) else {
        tracing::debug!(request_id = %rid, path = %request.uri().path(), "Missing bearer token");
        metrics::record_token_rejected("missing");
        return Err(AppError::unauthorized("missing bearer token"));
    };

    let claims = state.tokens.parse(token).map_err(|err| {
        let reason = match err {
            TokenError::Expired => "expired",
            _ => "invalid",
        };
        tracing::debug!(request_id = %rid, reason, "Bearer token rejected");
        metrics::record_token_rejected(reason);
        AppError::from(err)
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
