//! In-memory fact store
//!
//! Default backend for development and the no-config mode. Data is lost on
//! restart.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::{debug, info};

use dedup_core::types::{Dif, DifSet, RegistrationOutcome};

use super::{FactStore, StoreError};

/// In-memory fact store implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: RwLock<HashSet<String>>,
    facts: RwLock<HashMap<String, HashSet<DifSet>>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FactStore for MemoryStore {
    async fn ensure_keys(&self, keys: &HashSet<String>) -> Result<(), StoreError> {
        let mut known = self.keys.write().unwrap();
        known.extend(keys.iter().cloned());
        Ok(())
    }

    async fn register_key(&self, key: &str) -> Result<RegistrationOutcome, StoreError> {
        let new = self.keys.write().unwrap().insert(key.to_string());
        if new {
            info!(key = %key, "registered key");
        }
        Ok(RegistrationOutcome::from_new(new))
    }

    async fn has(&self, key: &str, difs: &[Dif]) -> Result<bool, StoreError> {
        let facts = self.facts.read().unwrap();
        Ok(facts
            .get(key)
            .is_some_and(|seen| seen.contains(&DifSet::new(difs))))
    }

    async fn add(&self, key: &str, difs: &[Dif]) -> Result<(), StoreError> {
        let mut facts = self.facts.write().unwrap();
        facts
            .entry(key.to_string())
            .or_default()
            .insert(DifSet::new(difs));
        debug!(key = %key, "recorded fact");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.keys.write().unwrap().clear();
        self.facts.write().unwrap().clear();
        Ok(())
    }
}
