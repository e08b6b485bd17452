//! Login orchestration.
//!
//! ```text
//! validate input → look up identity → compare secret → issue token
//!   EINVALID         ENOTFOUND          EUNAUTHORIZED    EINTERNAL
//! ```
//!
//! One attempt per call. No attempt counters or other state survive a call,
//! and a login never writes to the registry.

use std::sync::Arc;

use crate::auth::registry::{RegistryError, UserRegistry};
use crate::auth::token::{TokenPair, TokenService};
use crate::error::AppError;

pub struct AuthFlow {
    registry: Arc<UserRegistry>,
    tokens: Arc<dyn TokenService>,
    mask_unknown_users: bool,
}

impl AuthFlow {
    pub fn new(registry: Arc<UserRegistry>, tokens: Arc<dyn TokenService>) -> Self {
        Self {
            registry,
            tokens,
            mask_unknown_users: false,
        }
    }

    /// Report unknown usernames as `Unauthorized` instead of `NotFound`, so a
    /// client cannot tell which half of the credential was wrong.
    pub fn with_masked_unknown_users(mut self, mask: bool) -> Self {
        self.mask_unknown_users = mask;
        self
    }

    pub fn registry(&self) -> &Arc<UserRegistry> {
        &self.registry
    }

    /// Exchange a username/password for a token pair.
    pub fn login(&self, username: &str, password: &str) -> Result<TokenPair, AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::invalid("username and password are required"));
        }

        let identity = match self.registry.find_by_username(username) {
            Ok(identity) => identity,
            Err(RegistryError::NotFound(_)) if self.mask_unknown_users => {
                tracing::debug!("Login rejected: unknown user (masked)");
                return Err(AppError::unauthorized("invalid credentials"));
            }
            Err(err) => return Err(err.into()),
        };

        // Plain equality; not constant-time.
        if identity.password_secret != password {
            tracing::debug!(user_id = identity.id, "Login rejected: password mismatch");
            return Err(AppError::unauthorized("invalid credentials"));
        }

        let pair = self.tokens.exchange(&identity).map_err(|err| {
            AppError::internal(format!("token issuance for user {} failed: {err}", identity.id))
        })?;

        tracing::info!(user_id = identity.id, expires_at = pair.expires_at, "Login succeeded");
        Ok(pair)
    }
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow")
            .field("registry", &self.registry)
            .field("mask_unknown_users", &self.mask_unknown_users)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::registry::Identity;
    use crate::auth::token::{Claims, JwtTokenService, TokenError};
    use std::time::Duration;

    fn registry() -> Arc<UserRegistry> {
        Arc::new(
            UserRegistry::from_identities([
                Identity::new(1, "alice", "Alice", "s3cret"),
                Identity::new(2, "bob", "Bob", "hunter2"),
            ])
            .unwrap(),
        )
    }

    fn jwt() -> Arc<JwtTokenService> {
        Arc::new(JwtTokenService::new(b"flow-test-secret", Duration::from_secs(60)))
    }

    fn flow() -> AuthFlow {
        AuthFlow::new(registry(), jwt())
    }

    /// Always fails to sign.
    struct BrokenSigner;

    impl TokenService for BrokenSigner {
        fn exchange(&self, _identity: &Identity) -> Result<TokenPair, TokenError> {
            Err(TokenError::Signing("key rejected".into()))
        }

        fn parse(&self, _token: &str) -> Result<Claims, TokenError> {
            Err(TokenError::Invalid)
        }
    }

    #[test]
    fn test_successful_login_carries_subject() {
        let tokens = jwt();
        let flow = AuthFlow::new(registry(), tokens.clone());

        let pair = flow.login("alice", "s3cret").unwrap();
        assert_eq!(tokens.parse(&pair.access_token).unwrap().subject_id, 1);
    }

    #[test]
    fn test_empty_fields_are_invalid_regardless_of_registry() {
        let flows = [flow(), AuthFlow::new(Arc::new(UserRegistry::new()), jwt())];
        for flow in &flows {
            for (user, pass) in [("", "s3cret"), ("alice", ""), ("", "")] {
                assert!(matches!(flow.login(user, pass), Err(AppError::InvalidArgument(_))));
            }
        }
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        assert!(matches!(flow().login("mallory", "s3cret"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_wrong_password_is_unauthorized() {
        let flow = flow();
        let before = flow.registry().len();

        let err = flow.login("alice", "hunter2").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(!err.to_string().contains("password"));
        assert_eq!(flow.registry().len(), before);
        assert_eq!(flow.registry().find_by_username("alice").unwrap().password_secret, "s3cret");
    }

    #[test]
    fn test_masking_hides_unknown_users() {
        let flow = flow().with_masked_unknown_users(true);
        let unknown = flow.login("mallory", "s3cret").unwrap_err();
        let wrong = flow.login("alice", "nope").unwrap_err();
        assert_eq!(unknown, wrong);
    }

    #[test]
    fn test_signing_failure_is_internal() {
        let flow = AuthFlow::new(registry(), Arc::new(BrokenSigner));
        assert!(matches!(flow.login("bob", "hunter2"), Err(AppError::Internal(_))));
    }
}
