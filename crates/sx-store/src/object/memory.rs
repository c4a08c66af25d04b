//! In-memory object store for tests and ephemeral deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use sx_core::{ObjectInfo, Result};

use super::{describe, validate_key, ObjectStore, StoredObject};

/// [`ObjectStore`] over a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored bodies.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, body: Bytes) -> Result<ObjectInfo> {
        validate_key(key)?;
        let info = describe(key, &body);
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                info: info.clone(),
                body,
            },
        );
        Ok(info)
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        validate_key(key)?;
        Ok(self.objects.read().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.objects.write().remove(key);
        Ok(())
    }
}
