//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_BIND_ADDRESS: &str = "CITY_API_BIND_ADDRESS";
pub const ENV_DOMAIN: &str = "CITY_API_DOMAIN";
pub const ENV_JWT_SECRET: &str = "CITY_API_JWT_SECRET";
pub const ENV_TOKEN_TTL_SECS: &str = "CITY_API_TOKEN_TTL_SECS";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { name: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { name, value } => write!(f, "Invalid value for {}: '{}'", name, value),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from an optional TOML file plus process environment, then validate.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            parse_config(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse TOML without validating.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Overlay environment values on a parsed config.
///
/// `lookup` is `std::env::var` in production; tests pass a map.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    if let Some(domain) = lookup(ENV_DOMAIN) {
        config.listener.domain = if domain.is_empty() { None } else { Some(domain) };
    }
    if let Some(secret) = lookup(ENV_JWT_SECRET) {
        config.auth.jwt_secret = secret;
    }
    if let Some(ttl) = lookup(ENV_TOKEN_TTL_SECS) {
        config.auth.token_ttl_secs = ttl.parse().map_err(|_| ConfigError::Env {
            name: ENV_TOKEN_TTL_SECS,
            value: ttl,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"
            domain = "old.example.com"

            [auth]
            jwt_secret = "from-file"
            "#,
        )
        .unwrap();

        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_BIND_ADDRESS, ":8443"),
                (ENV_DOMAIN, ""),
                (ENV_JWT_SECRET, "from-env"),
                (ENV_TOKEN_TTL_SECS, "120"),
            ]),
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, ":8443");
        assert_eq!(config.listener.domain, None);
        assert_eq!(config.auth.jwt_secret, "from-env");
        assert_eq!(config.auth.token_ttl_secs, 120);
    }

    #[test]
    fn test_bad_ttl_in_env_is_an_error() {
        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_TOKEN_TTL_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: ENV_TOKEN_TTL_SECS, .. }));
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(parse_config("listener = 3"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/city-api.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
