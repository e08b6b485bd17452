//! Metrics collection and exposition.
//!
//! # Metrics
//! - `city_api_requests_total` (counter): requests by method, status
//! - `city_api_request_duration_seconds` (histogram): latency by method
//! - `city_api_logins_total` (counter): login attempts by outcome
//! - `city_api_token_rejections_total` (counter): rejected bearer tokens by reason
//!
//! Without an installed recorder every call below is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "city_api_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "city_api_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// `outcome` is "ok" or the error code.
pub fn record_login(outcome: &'static str) {
    metrics::counter!("city_api_logins_total", "outcome" => outcome).increment(1);
}

pub fn record_token_rejected(reason: &'static str) {
    metrics::counter!("city_api_token_rejections_total", "reason" => reason).increment(1);
}

/// Middleware recording count and latency of every request.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), start);
    response
}
