//! Storage abstraction for the dedup service
//!
//! The fact store is the key-scoped durable set of previously-seen dif
//! collections, plus the persisted ledger of registered keys. It is the
//! single source of truth for "has this key seen this dif-set" and is shared
//! across all concurrent requests.
//!
//! The engine issues `has` and `add` as two separate calls per collection
//! and never assumes an atomic check-and-set; backends advertise whether
//! they provide one via [`FactStore::supports_atomic_check_and_set`].

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::HashSet;
use std::fmt::Debug;

use async_trait::async_trait;

use dedup_core::types::{Dif, RegistrationOutcome};

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Key-scoped fact store.
///
/// Implementations must be thread-safe; membership facts recorded under one
/// key must never be visible under another.
#[async_trait]
pub trait FactStore: Send + Sync + Debug {
    /// Idempotently pre-register a batch of keys at startup
    async fn ensure_keys(&self, keys: &HashSet<String>) -> Result<(), StoreError>;

    /// Persist a key, reporting whether it was new
    async fn register_key(&self, key: &str) -> Result<RegistrationOutcome, StoreError>;

    /// Whether the canonical set of these difs is already recorded under the key
    async fn has(&self, key: &str, difs: &[Dif]) -> Result<bool, StoreError>;

    /// Record the canonical set of these difs under the key
    async fn add(&self, key: &str, difs: &[Dif]) -> Result<(), StoreError>;

    /// Wipe all facts and keys. Test/maintenance only.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Whether the `has`/`add` pair is atomic under concurrent submissions.
    /// Backends without this guarantee may classify identical concurrent
    /// submissions as unique twice.
    fn supports_atomic_check_and_set(&self) -> bool {
        false
    }
}

/// Startup self-check and backend conformance probe.
///
/// Exercises key registration, fact membership, order-independence, key
/// isolation, and `clear` against scratch data, then wipes the store. Only
/// run against stores whose contents may be discarded.
pub async fn smoke_test(store: &dyn FactStore) -> Result<(), StoreError> {
    let key = "smoke-test-key";
    store.register_key(key).await?;
    if store.register_key(key).await? != RegistrationOutcome::AlreadyRegistered {
        return Err(StoreError::Backend(
            "key registration is not idempotent".into(),
        ));
    }

    let difs = [
        Dif::new("smoke-type", "smoke-value-1"),
        Dif::new("smoke-type", "smoke-value-2"),
    ];
    if store.has(key, &difs).await? {
        return Err(StoreError::Backend("store reports unrecorded facts".into()));
    }

    store.add(key, &difs).await?;
    if !store.has(key, &difs).await? {
        return Err(StoreError::Backend("recorded fact not found".into()));
    }

    let reversed = [difs[1].clone(), difs[0].clone()];
    if !store.has(key, &reversed).await? {
        return Err(StoreError::Backend("membership depends on dif order".into()));
    }

    if store.has("smoke-test-other-key", &difs).await? {
        return Err(StoreError::Backend("facts leak across keys".into()));
    }

    store.clear().await?;
    if store.has(key, &difs).await? {
        return Err(StoreError::Backend("clear left facts behind".into()));
    }

    Ok(())
}
