//! Authorized-key registry
//!
//! Holds the set of keys allowed to submit identify requests and the single
//! super-key allowed to mint new keys. The set is seeded at startup, grows
//! on successful registration, and never shrinks at runtime.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::info;

use dedup_core::types::RegistrationOutcome;

use crate::storage::{FactStore, StoreError};

/// Key registration failure
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The presented super-key does not match the configured one
    #[error("super-key mismatch")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Authorized keys, the super-key, and the store that persists them
#[derive(Debug)]
pub struct KeyRegistry {
    keys: RwLock<HashSet<String>>,
    superkey: String,
    store: Arc<dyn FactStore>,
}

impl KeyRegistry {
    /// Seed the registry, idempotently pre-registering the seed keys with
    /// the store
    pub async fn bootstrap(
        keys: HashSet<String>,
        superkey: String,
        store: Arc<dyn FactStore>,
    ) -> Result<Self, StoreError> {
        store.ensure_keys(&keys).await?;
        info!(count = keys.len(), "key registry seeded");

        Ok(Self {
            keys: RwLock::new(keys),
            superkey,
            store,
        })
    }

    /// Whether a key may submit identify requests
    pub fn is_authorized(&self, key: &str) -> bool {
        self.keys.read().unwrap().contains(key)
    }

    /// Mint a new client key.
    ///
    /// The store owns the registered / already-registered decision; the
    /// in-memory set is updated idempotently either way. The write lock is
    /// held only for the insertion, so concurrent readers never observe a
    /// partially-updated set.
    pub async fn register(
        &self,
        superkey: &str,
        newkey: &str,
    ) -> Result<RegistrationOutcome, RegistryError> {
        if superkey != self.superkey {
            return Err(RegistryError::Forbidden);
        }

        let outcome = self.store.register_key(newkey).await?;
        self.keys.write().unwrap().insert(newkey.to_string());
        info!(key = %newkey, outcome = outcome.as_str(), "key registered");
        Ok(outcome)
    }
}
