//! HTTP application setup.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Gate `/v1/city` behind bearer tokens
//! - Wire up middleware (panic guard, limits, timeout, security headers,
//!   CORS, metrics, tracing, request ID)

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

use crate::auth::{AuthFlow, TokenService};
use crate::city::CityService;
use crate::config::HttpConfig;
use crate::http::middleware::{auth::require_token, guard, rejection};
use crate::http::{cities, login, request};
use crate::observability::metrics;
use crate::security::headers;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthFlow>,
    pub tokens: Arc<dyn TokenService>,
    pub cities: Arc<dyn CityService>,
}

impl AppState {
    pub fn new(
        auth: Arc<AuthFlow>,
        tokens: Arc<dyn TokenService>,
        cities: Arc<dyn CityService>,
    ) -> Self {
        Self {
            auth,
            tokens,
            cities,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").field("auth", &self.auth).finish_non_exhaustive()
    }
}

/// Build the router with all middleware layers.
pub fn build_router(state: AppState, config: &HttpConfig) -> Router {
    let protected = Router::new()
        .route("/v1/city", post(cities::create_city))
        .route("/v1/city/search", post(cities::search_cities))
        .route(
            "/v1/city/{name}",
            get(cities::get_city)
                .delete(cities::delete_city)
                .patch(cities::update_city),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    let router = Router::new()
        .route("/", get(cities::list_cities))
        .route("/v1/auth/login", post(login::login))
        .merge(protected)
        .with_state(state)
        .layer(guard::layer())
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(middleware::map_response(rejection::envelope_rejections));

    let router = headers::apply(router, config).layer(middleware::from_fn(metrics::track_requests));
    request::with_request_tracing(router)
}
