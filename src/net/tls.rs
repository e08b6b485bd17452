//! TLS termination with automatically managed certificates.
//!
//! Certificates for the configured domain are obtained and renewed over ACME
//! (TLS-ALPN-01), so the listener must be reachable on 443 from the CA.

use futures_util::StreamExt;
use rustls_acme::{axum::AxumAcceptor, caches::DirCache, AcmeConfig};
use tokio::task::JoinHandle;

use crate::config::AcmeSettings;
use crate::net::listener::ListenerError;

/// Build an acceptor that terminates TLS for `domain`.
///
/// Also returns the task driving certificate ordering and renewal; it runs
/// until aborted.
pub fn acme_acceptor(
    domain: &str,
    settings: &AcmeSettings,
) -> Result<(AxumAcceptor, JoinHandle<()>), ListenerError> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(ListenerError::Tls("empty domain".into()));
    }

    let mut state = AcmeConfig::new([domain.to_string()])
        .contact(settings.contact.iter().map(|email| format!("mailto:{email}")))
        .cache_option(settings.cache_dir.clone().map(DirCache::new))
        .directory_lets_encrypt(settings.production)
        .state();

    let acceptor = state.axum_acceptor(state.default_rustls_config());

    let domain = domain.to_string();
    let task = tokio::spawn(async move {
        while let Some(event) = state.next().await {
            match event {
                Ok(ok) => tracing::info!(domain = %domain, event = ?ok, "ACME event"),
                Err(err) => tracing::error!(domain = %domain, error = ?err, "ACME error"),
            }
        }
    });

    tracing::info!(
        production = settings.production,
        cache = ?settings.cache_dir,
        "ACME certificate management enabled"
    );
    Ok((acceptor, task))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_domain_is_rejected() {
        let result = acme_acceptor("  ", &AcmeSettings::default());
        assert!(matches!(result, Err(ListenerError::Tls(_))));
    }
}
