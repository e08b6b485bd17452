//! `POST /v1/auth/login`.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::TokenPair;
use crate::error::AppError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Login request body. Missing fields read as empty and are rejected by the flow.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginParams {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: TokenPair,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginParams>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(params) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Login body rejected");
        metrics::record_login(crate::error::EINVALID);
        AppError::invalid("invalid request")
    })?;

    match state.auth.login(&params.username, &params.password) {
        Ok(token) => {
            metrics::record_login("ok");
            Ok(Json(LoginResponse { token }))
        }
        Err(err) => {
            metrics::record_login(err.code());
            Err(err)
        }
    }
}
