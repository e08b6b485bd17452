//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::city::City;

/// Root configuration for the city API.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, TLS domain).
    pub listener: ListenerConfig,

    /// Token signing settings.
    pub auth: AuthConfig,

    /// HTTP middleware settings.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Seed identities for the user registry.
    pub users: Vec<UserConfig>,

    /// Seed rows for the city table.
    pub cities: Vec<City>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080", ":8080", "127.0.0.1:0").
    pub bind_address: String,

    /// Domain to serve over TLS. Certificates are provisioned via ACME.
    pub domain: Option<String>,

    /// Bind address of the HTTP→HTTPS redirect listener (TLS mode only).
    pub redirect_address: String,

    /// Time given to in-flight requests on shutdown, in milliseconds.
    pub shutdown_timeout_ms: u64,

    /// ACME account settings.
    pub acme: AcmeSettings,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            domain: None,
            redirect_address: "0.0.0.0:80".to_string(),
            shutdown_timeout_ms: 1_000,
            acme: AcmeSettings::default(),
        }
    }
}

impl ListenerConfig {
    pub fn use_tls(&self) -> bool {
        self.domain.is_some()
    }

    pub fn shutdown_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.shutdown_timeout_ms)
    }
}

/// ACME (Let's Encrypt) settings used when a domain is configured.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AcmeSettings {
    /// Contact emails for the ACME account.
    pub contact: Vec<String>,

    /// Directory for cached account keys and certificates.
    pub cache_dir: Option<String>,

    /// Use the production directory instead of staging.
    pub production: bool,
}

/// Token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Must be set.
    pub jwt_secret: String,

    /// Access token lifetime in seconds.
    pub token_ttl_secs: u64,

    /// Answer unknown usernames like wrong passwords (401 instead of 404).
    pub mask_unknown_users: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 900,
            mask_unknown_users: false,
        }
    }
}

impl AuthConfig {
    pub fn token_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.token_ttl_secs)
    }
}

/// HTTP middleware configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum body size in bytes.
    pub max_body_size: usize,

    /// Add security response headers.
    pub security_headers: bool,

    /// Allow cross-origin requests.
    pub cors: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            max_body_size: 1024 * 1024, // 1MB
            security_headers: true,
            cors: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A seed user.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
}

impl From<&UserConfig> for Identity {
    fn from(user: &UserConfig) -> Self {
        Identity::new(user.id, &user.username, &user.name, &user.password)
    }
}
