//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the user registry, token service and city table from config
//! - Assemble the router
//! - Bind listeners and begin accepting traffic
//! - Tear everything down within the configured shutdown timeout

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::auth::{AuthFlow, Clock, Identity, JwtTokenService, SystemClock, UserRegistry};
use crate::city::InMemoryCityService;
use crate::config::AppConfig;
use crate::http::{build_router, AppState};
use crate::net::{ApiServer, ListenerError, RedirectServer, ServeState};

#[derive(Debug, Error)]
pub enum StartupError {
    /// Seed users or cities are inconsistent.
    #[error("invalid seed data: {0}")]
    Seed(String),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    /// The serve loop ended on its own with an error.
    #[error("server failed: {0}")]
    ServeFailed(String),
}

/// Build shared application state reading the wall clock.
pub fn build_state(config: &AppConfig) -> Result<AppState, StartupError> {
    build_state_with_clock(config, Arc::new(SystemClock))
}

/// Build shared application state with an explicit time source.
pub fn build_state_with_clock(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<AppState, StartupError> {
    let registry = UserRegistry::from_identities(config.users.iter().map(Identity::from))
        .map_err(|e| StartupError::Seed(e.to_string()))?;
    let cities = InMemoryCityService::with_cities(config.cities.iter().cloned())
        .map_err(|e| StartupError::Seed(e.to_string()))?;

    let tokens = Arc::new(JwtTokenService::with_clock(
        config.auth.jwt_secret.as_bytes(),
        config.auth.token_ttl(),
        clock,
    ));

    tracing::info!(
        users = registry.len(),
        token_ttl_secs = config.auth.token_ttl_secs,
        mask_unknown_users = config.auth.mask_unknown_users,
        "Application state ready"
    );

    let auth = AuthFlow::new(Arc::new(registry), tokens.clone())
        .with_masked_unknown_users(config.auth.mask_unknown_users);

    Ok(AppState::new(Arc::new(auth), tokens, Arc::new(cities)))
}

/// A running service: API listener plus, in TLS mode, the redirect listener.
#[derive(Debug)]
pub struct Application {
    server: ApiServer,
    redirect: Option<RedirectServer>,
    state: AppState,
    shutdown_timeout: Duration,
}

impl Application {
    /// Build state from `config` and start listening.
    pub async fn start(config: &AppConfig) -> Result<Self, StartupError> {
        let state = build_state(config)?;
        Self::start_with_state(config, state).await
    }

    pub async fn start_with_state(config: &AppConfig, state: AppState) -> Result<Self, StartupError> {
        let router = build_router(state.clone(), &config.http);
        let server = ApiServer::open(&config.listener, router).await?;

        let redirect = match &config.listener.domain {
            Some(domain) => {
                match RedirectServer::open(&config.listener.redirect_address, domain).await {
                    Ok(redirect) => Some(redirect),
                    Err(e) => {
                        tracing::warn!(error = %e, "HTTP→HTTPS redirect listener not started");
                        None
                    }
                }
            }
            None => None,
        };

        Ok(Self {
            server,
            redirect,
            state,
            shutdown_timeout: config.listener.shutdown_timeout(),
        })
    }

    pub fn server(&self) -> &ApiServer {
        &self.server
    }

    pub fn redirect(&self) -> Option<&RedirectServer> {
        self.redirect.as_ref()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until `signal` resolves or the API listener dies, then stop.
    pub async fn run_until<F>(self, signal: F) -> Result<(), StartupError>
    where
        F: Future<Output = ()>,
    {
        let ended = tokio::select! {
            _ = signal => None,
            state = self.server.terminated() => Some(state),
        };

        self.stop().await?;

        match ended {
            Some(ServeState::Failed(reason)) => Err(StartupError::ServeFailed(reason)),
            _ => Ok(()),
        }
    }

    /// Close both listeners within the shutdown timeout.
    pub async fn stop(mut self) -> Result<(), StartupError> {
        if let Some(redirect) = self.redirect.as_mut() {
            if let Err(e) = redirect.close(self.shutdown_timeout).await {
                tracing::warn!(error = %e, "Redirect listener did not close cleanly");
            }
        }
        self.server.close(self.shutdown_timeout).await?;
        tracing::info!("Shutdown complete");
        Ok(())
    }
}
