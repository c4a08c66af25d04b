//! Filesystem-backed object store.
//!
//! Layout under the root directory:
//! - `{key}` holds the body
//! - `{key}.json` holds the [`ObjectInfo`] written alongside it

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use sx_core::{ObjectInfo, Result};

use super::{describe, validate_key, ObjectStore, StoredObject};

/// [`ObjectStore`] over a local directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn body_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn info_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, body: Bytes) -> Result<ObjectInfo> {
        validate_key(key)?;
        let info = describe(key, &body);

        tokio::fs::write(self.body_path(key), &body).await?;
        tokio::fs::write(self.info_path(key), serde_json::to_vec(&info)?).await?;

        tracing::debug!(key, size = info.size, "Wrote object");
        Ok(info)
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        validate_key(key)?;

        let body = match tokio::fs::read(self.body_path(key)).await {
            Ok(body) => Bytes::from(body),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let info = match tokio::fs::read(self.info_path(key)).await {
            Ok(raw) => serde_json::from_slice(&raw)?,
            // Body without a receipt: describe what is on disk.
            Err(e) if e.kind() == ErrorKind::NotFound => describe(key, &body),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(StoredObject { info, body }))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        for path in [self.body_path(key), self.info_path(key)] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        tracing::debug!(key, "Deleted object");
        Ok(())
    }
}
