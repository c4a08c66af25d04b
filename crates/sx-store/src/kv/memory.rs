//! In-memory metadata store for tests and ephemeral deployments.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use parking_lot::RwLock;
use sx_core::Result;

use super::{KeyListing, ListOptions, MetadataStore};

/// [`MetadataStore`] over a `BTreeMap`, with the same ordering and paging as
/// the SQLite backend.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn list(&self, options: ListOptions) -> Result<KeyListing> {
        let limit = options.effective_limit();
        let lower = match options.start_after()? {
            Some(after) => Bound::Excluded(after),
            None => Bound::Unbounded,
        };
        let names: Vec<String> = self
            .entries
            .read()
            .range((lower, Bound::Unbounded))
            .take(limit + 1)
            .map(|(key, _)| key.clone())
            .collect();
        Ok(KeyListing::from_overfetch(names, limit))
    }
}
