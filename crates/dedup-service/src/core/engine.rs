//! Duplicate-detection engine
//!
//! The per-item, per-collection scan against the key-scoped fact store.
//! This is the part of the service with real decision logic; everything
//! around it exists to feed it well-formed requests and render its verdicts.

use std::sync::Arc;

use tracing::debug;

use dedup_core::types::{ContentItem, Uniqueness};

use crate::storage::{FactStore, StoreError};

/// Per-item classification, in submission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemVerdict {
    pub id: String,
    pub result: Uniqueness,
}

/// Duplicate-detection engine over a shared fact store
#[derive(Debug, Clone)]
pub struct DedupEngine {
    store: Arc<dyn FactStore>,
}

impl DedupEngine {
    /// Create an engine over the given store
    pub fn new(store: Arc<dyn FactStore>) -> Self {
        Self { store }
    }

    /// Classify each item as unique or duplicate under the given key,
    /// recording newly-seen collections as it goes.
    ///
    /// The decision is conjunctive across an item's collections: one
    /// already-recorded collection makes the whole item a duplicate. The
    /// scan does not short-circuit — unseen collections of a duplicate item
    /// are still recorded. Recording happens collection-by-collection, so a
    /// collection value repeated later in the same request is classified
    /// against the earlier occurrence's write.
    ///
    /// `has` and `add` are two separate store calls; with a backend whose
    /// `supports_atomic_check_and_set` is false, identical concurrent
    /// submissions under one key may both come back unique.
    pub async fn identify(
        &self,
        key: &str,
        items: &[ContentItem],
    ) -> Result<Vec<ItemVerdict>, StoreError> {
        let mut verdicts = Vec::with_capacity(items.len());

        for item in items {
            let mut unique = true;
            for collection in &item.difcollections {
                if self.store.has(key, &collection.difs).await? {
                    unique = false;
                } else {
                    self.store.add(key, &collection.difs).await?;
                }
            }

            let result = Uniqueness::from_unique(unique);
            debug!(key = %key, id = %item.id, result = result.as_str(), "classified item");
            verdicts.push(ItemVerdict {
                id: item.id.clone(),
                result,
            });
        }

        Ok(verdicts)
    }
}
