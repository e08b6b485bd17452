//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use city_api::city::City;
use city_api::config::{AppConfig, UserConfig};
use city_api::net::ApiServer;
use city_api::Application;

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "s3cret";
pub const USER_ID: i64 = 1;

/// Config listening on an ephemeral loopback port with one user and one city.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.listener.shutdown_timeout_ms = 2_000;
    config.auth.jwt_secret = "integration-secret".into();
    config.users = vec![UserConfig {
        id: USER_ID,
        username: USERNAME.into(),
        name: "Alice".into(),
        password: PASSWORD.into(),
    }];
    config.cities = vec![City {
        id: 0,
        name: "Napoli".into(),
        country_code: "ITA".into(),
        district: "Campania".into(),
        population: 1_002_619,
    }];
    config
}

/// Start the full application from [`test_config`].
pub async fn start_app() -> Application {
    Application::start(&test_config()).await.unwrap()
}

/// Serve an arbitrary router on an ephemeral loopback port.
pub async fn start_router(router: Router) -> ApiServer {
    ApiServer::open(&test_config().listener, router).await.unwrap()
}

/// Client that opens a fresh connection per request and ignores proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
