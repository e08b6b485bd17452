//! In-memory credential store.
//!
//! # Concurrency
//! Guarded by a `RwLock`: any number of lookups run together, a write waits
//! for readers to drain and excludes new ones while it holds the lock. All
//! operations are in-memory and never suspend.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use thiserror::Error;

use crate::error::AppError;

/// A stored user that can authenticate.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub password_secret: String,
}

impl Identity {
    pub fn new(
        id: i64,
        username: impl Into<String>,
        display_name: impl Into<String>,
        password_secret: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            display_name: display_name.into(),
            password_secret: password_secret.into(),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("password_secret", &"<redacted>")
            .finish()
    }
}

/// Errors raised by [`UserRegistry`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("user not found: {0}")]
    NotFound(String),

    #[error("username already registered: {0}")]
    Duplicate(String),

    /// A writer panicked while holding the lock.
    #[error("user registry lock poisoned")]
    Poisoned,
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(_) => AppError::not_found("user not found"),
            RegistryError::Duplicate(name) => {
                AppError::invalid(format!("username already registered: {name}"))
            }
            RegistryError::Poisoned => AppError::internal("user registry corrupted"),
        }
    }
}

/// Concurrent-safe registry of identities indexed by username.
#[derive(Default)]
pub struct UserRegistry {
    users: RwLock<HashMap<String, Identity>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a set of identities, rejecting duplicate usernames.
    pub fn from_identities<I>(identities: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Identity>,
    {
        let registry = Self::new();
        for identity in identities {
            registry.insert(identity)?;
        }
        Ok(registry)
    }

    /// Look up an identity by its exact username.
    pub fn find_by_username(&self, username: &str) -> Result<Identity, RegistryError> {
        let users = self.users.read().map_err(|_| RegistryError::Poisoned)?;
        users
            .get(username)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(username.to_string()))
    }

    /// Add a new identity. The username must not already be taken.
    pub fn insert(&self, identity: Identity) -> Result<(), RegistryError> {
        let mut users = self.users.write().map_err(|_| RegistryError::Poisoned)?;
        if users.contains_key(&identity.username) {
            return Err(RegistryError::Duplicate(identity.username));
        }
        tracing::debug!(user_id = identity.id, username = %identity.username, "Identity registered");
        users.insert(identity.username.clone(), identity);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for UserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRegistry")
            .field("users", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sample() -> Vec<Identity> {
        vec![
            Identity::new(1, "Pippo_Boss", "Pippo Pluto", "c1p0ll1n0"),
            Identity::new(2, "Sabaku no Mangaka", "Luca", "luc1ll0n4"),
            Identity::new(3, "Ciruzzo", "Ciro Esposito", "password68$"),
            Identity::new(4, "IlMassasseo", "Edoardo", "password"),
        ]
    }

    #[test]
    fn test_every_stored_identity_is_found() {
        let users = sample();
        let registry = UserRegistry::from_identities(users.clone()).unwrap();

        for user in &users {
            assert_eq!(registry.find_by_username(&user.username).unwrap(), *user);
        }
        assert_eq!(registry.len(), users.len());
    }

    #[test]
    fn test_unknown_username_is_not_found() {
        let registry = UserRegistry::from_identities(sample()).unwrap();

        for name in ["", "pippo_boss", "Ciruzzo ", "nobody", "Sabaku"] {
            assert_eq!(
                registry.find_by_username(name),
                Err(RegistryError::NotFound(name.to_string()))
            );
        }
    }

    #[test]
    fn test_duplicate_username_is_rejected() {
        let registry = UserRegistry::from_identities(sample()).unwrap();
        let err = registry
            .insert(Identity::new(9, "Ciruzzo", "Other", "x"))
            .unwrap_err();

        assert_eq!(err, RegistryError::Duplicate("Ciruzzo".into()));
        assert_eq!(registry.find_by_username("Ciruzzo").unwrap().id, 3);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let identity = Identity::new(1, "alice", "Alice", "s3cret");
        let rendered = format!("{identity:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("alice"));
    }

    #[test]
    fn test_poisoned_lock_is_internal() {
        let registry = Arc::new(UserRegistry::from_identities(sample()).unwrap());
        let poisoner = registry.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.users.write().unwrap();
            panic!("writer died");
        })
        .join();

        let err = registry.find_by_username("Ciruzzo").unwrap_err();
        assert_eq!(err, RegistryError::Poisoned);
        assert!(matches!(AppError::from(err), AppError::Internal(_)));
    }

    #[test]
    fn test_concurrent_lookups_are_consistent() {
        let users = sample();
        let registry = Arc::new(UserRegistry::from_identities(users.clone()).unwrap());

        let handles: Vec<_> = (0..16)
            .map(|worker| {
                let registry = registry.clone();
                let users = users.clone();
                std::thread::spawn(move || {
                    for i in 0..2_000 {
                        let user = &users[(worker + i) % users.len()];
                        let found = registry.find_by_username(&user.username).unwrap();
                        assert_eq!(&found, user);
                        assert!(registry.find_by_username("ghost").is_err());
                    }
                })
            })
            .collect();

        // A writer running alongside the readers never disturbs existing entries.
        for id in 100..200 {
            registry
                .insert(Identity::new(id, format!("user-{id}"), "Generated", "pw"))
                .unwrap();
        }

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), users.len() + 100);
    }
}
