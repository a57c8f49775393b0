//! File-backed fact store
//!
//! Persists the whole ledger (registered keys plus per-key fact sets) as a
//! JSON document, rewritten through a temp-file rename on every mutation and
//! reloaded at startup. Suitable for single-instance deployments; it makes
//! registered keys and recorded facts survive restarts.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use dedup_core::types::{Dif, DifSet, RegistrationOutcome};

use super::{FactStore, StoreError};

/// Persisted ledger contents
#[derive(Debug, Default, Serialize, Deserialize)]
struct Ledger {
    keys: BTreeSet<String>,
    facts: BTreeMap<String, BTreeSet<DifSet>>,
}

/// File-backed fact store implementation
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    ledger: Mutex<Ledger>,
}

impl FileStore {
    /// Open a ledger file, creating an empty ledger if none exists yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let ledger = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                StoreError::Serialization(format!("{}: {err}", path.display()))
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => Ledger::default(),
            Err(err) => return Err(err.into()),
        };

        info!(path = %path.display(), "opened fact ledger");
        Ok(Self {
            path,
            ledger: Mutex::new(ledger),
        })
    }

    /// Rewrite the ledger file; the rename keeps a crash from truncating it
    fn persist(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(ledger)
            .map_err(|err| StoreError::Serialization(err.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl FactStore for FileStore {
    async fn ensure_keys(&self, keys: &HashSet<String>) -> Result<(), StoreError> {
        let mut ledger = self.ledger.lock().unwrap();
        let before = ledger.keys.len();
        ledger.keys.extend(keys.iter().cloned());
        if ledger.keys.len() != before {
            self.persist(&ledger)?;
        }
        Ok(())
    }

    async fn register_key(&self, key: &str) -> Result<RegistrationOutcome, StoreError> {
        let mut ledger = self.ledger.lock().unwrap();
        let new = ledger.keys.insert(key.to_string());
        if new {
            self.persist(&ledger)?;
            info!(key = %key, "registered key");
        }
        Ok(RegistrationOutcome::from_new(new))
    }

    async fn has(&self, key: &str, difs: &[Dif]) -> Result<bool, StoreError> {
        let ledger = self.ledger.lock().unwrap();
        Ok(ledger
            .facts
            .get(key)
            .is_some_and(|seen| seen.contains(&DifSet::new(difs))))
    }

    async fn add(&self, key: &str, difs: &[Dif]) -> Result<(), StoreError> {
        let mut ledger = self.ledger.lock().unwrap();
        let new = ledger
            .facts
            .entry(key.to_string())
            .or_default()
            .insert(DifSet::new(difs));
        if new {
            self.persist(&ledger)?;
            debug!(key = %key, "recorded fact");
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut ledger = self.ledger.lock().unwrap();
        *ledger = Ledger::default();
        self.persist(&ledger)
    }
}
