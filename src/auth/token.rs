//! Token issuance and validation.
//!
//! [`TokenService`] is the contract the rest of the crate depends on: exchange
//! a verified identity for a token pair, and parse a presented token back
//! into claims. [`JwtTokenService`] is the HS256 implementation.
//!
//! Time never comes from inside the algorithm. `issue_at`/`verify_at` take
//! `now` explicitly; `exchange`/`parse` read it from the injected [`Clock`].

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::clock::{Clock, SystemClock};
use crate::auth::registry::Identity;
use crate::error::AppError;

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    /// Unix seconds.
    pub issued_at: u64,
    /// Unix seconds.
    pub expires_at: u64,
}

/// Verified payload of a presented token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub subject_id: i64,
    pub issued_at: u64,
    pub expires_at: u64,
}

impl Claims {
    pub fn is_valid_at(&self, now: u64) -> bool {
        now < self.expires_at
    }
}

/// Registered JWT claim set as it travels on the wire.
#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: String,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed token, wrong algorithm, missing claim or bad signature.
    #[error("invalid token")]
    Invalid,

    #[error("token expired")]
    Expired,

    /// Signing failed; no token was produced.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AppError::InvalidToken,
            TokenError::Expired => AppError::ExpiredToken,
            TokenError::Signing(detail) => AppError::internal(detail),
        }
    }
}

/// Token exchange/parse contract.
pub trait TokenService: Send + Sync {
    /// Issue a token pair for a verified identity.
    fn exchange(&self, identity: &Identity) -> Result<TokenPair, TokenError>;

    /// Verify a presented token and decode its claims.
    fn parse(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HMAC-SHA256 signed JWTs with a fixed time-to-live.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    has_secret: bool,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Create a service reading the wall clock.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self::with_clock(secret, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            has_secret: !secret.is_empty(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token as of `now` (unix seconds).
    pub fn issue_at(&self, identity: &Identity, now: u64) -> Result<TokenPair, TokenError> {
        if !self.has_secret {
            return Err(TokenError::Signing("signing secret is empty".into()));
        }

        let expires_at = now
            .checked_add(self.ttl.as_secs())
            .ok_or_else(|| TokenError::Signing("expiry overflows".into()))?;
        let claims = JwtClaims {
            sub: identity.id.to_string(),
            iat: now,
            exp: expires_at,
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            issued_at: now,
            expires_at,
        })
    }

    /// Verify a token as of `now` (unix seconds).
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Claims, TokenError> {
        if !self.has_secret {
            return Err(TokenError::Invalid);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the injected time.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map_err(map_jwt_error)?;

        let subject_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Invalid)?;
        let claims = Claims {
            subject_id,
            issued_at: data.claims.iat,
            expires_at: data.claims.exp,
        };

        if !claims.is_valid_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

impl TokenService for JwtTokenService {
    fn exchange(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        self.issue_at(identity, self.clock.now())
    }

    fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, self.clock.now())
    }
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    }
}
