//! Configuration validation.
//!
//! Serde handles syntax; this checks meaning. All errors are collected, not
//! just the first.

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::new("listener.bind_address", "must not be empty"));
    }
    if let Some(domain) = &config.listener.domain {
        if domain.trim().is_empty() {
            errors.push(ValidationError::new("listener.domain", "must not be empty when set"));
        }
        if config.listener.redirect_address.trim().is_empty() {
            errors.push(ValidationError::new(
                "listener.redirect_address",
                "must not be empty in TLS mode",
            ));
        }
    }
    if config.listener.shutdown_timeout_ms == 0 {
        errors.push(ValidationError::new("listener.shutdown_timeout_ms", "must be > 0"));
    }

    if config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::new("auth.jwt_secret", "must be set"));
    }
    if config.auth.token_ttl_secs == 0 {
        errors.push(ValidationError::new("auth.token_ttl_secs", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    let mut usernames = HashSet::new();
    let mut ids = HashSet::new();
    for (i, user) in config.users.iter().enumerate() {
        let field = format!("users[{i}]");
        if user.username.is_empty() {
            errors.push(ValidationError::new(&field, "username must not be empty"));
        } else if !usernames.insert(user.username.as_str()) {
            errors.push(ValidationError::new(
                &field,
                format!("duplicate username '{}'", user.username),
            ));
        }
        if user.password.is_empty() {
            errors.push(ValidationError::new(&field, "password must not be empty"));
        }
        if !ids.insert(user.id) {
            errors.push(ValidationError::new(&field, format!("duplicate id {}", user.id)));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::UserConfig;

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "secret".into();
        config
    }

    fn user(id: i64, username: &str, password: &str) -> UserConfig {
        UserConfig {
            id,
            username: username.into(),
            name: String::new(),
            password: password.into(),
        }
    }

    #[test]
    fn test_defaults_with_secret_are_valid() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let errors = validate_config(&AppConfig::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "auth.jwt_secret"));
    }

    #[test]
    fn test_all_errors_are_reported() {
        let mut config = AppConfig::default();
        config.auth.token_ttl_secs = 0;
        config.listener.domain = Some(" ".into());
        config.listener.shutdown_timeout_ms = 0;
        config.users = vec![user(1, "a", "x"), user(1, "a", ""), user(2, "", "y")];

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();

        assert!(fields.contains(&"auth.jwt_secret"));
        assert!(fields.contains(&"auth.token_ttl_secs"));
        assert!(fields.contains(&"listener.domain"));
        assert!(fields.contains(&"listener.shutdown_timeout_ms"));
        assert_eq!(errors.iter().filter(|e| e.field == "users[1]").count(), 3);
        assert_eq!(errors.iter().filter(|e| e.field == "users[2]").count(), 1);
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
