//! Binary object store holding raw upload bodies keyed by image id.

mod fs;
mod memory;

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use sha2::{Digest, Sha256};
use sx_core::{Error, ObjectInfo, Result};

/// A stored body together with its write receipt.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub info: ObjectInfo,
    pub body: Bytes,
}

/// External blob service holding raw file bytes keyed by image id.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write (or overwrite) a body and report what was stored.
    async fn put(&self, key: &str, body: Bytes) -> Result<ObjectInfo>;

    /// Read a body back, `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>>;

    /// Remove a body. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Build the receipt for a body written now.
pub(crate) fn describe(key: &str, body: &[u8]) -> ObjectInfo {
    let etag = compute_etag(body);
    ObjectInfo {
        key: key.to_string(),
        version: uuid::Uuid::new_v4().simple().to_string(),
        size: body.len() as u64,
        http_etag: format!("\"{etag}\""),
        etag,
        uploaded: Utc::now(),
    }
}

/// First 16 bytes of the SHA-256 digest, hex encoded.
fn compute_etag(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    hex::encode(&digest[..16])
}

/// Reject keys that could escape a storage directory.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(Error::Validation(format!("Invalid object key: {key:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_is_32_hex_chars() {
        let etag = compute_etag(b"test data");
        assert_eq!(etag.len(), 32);
        assert!(etag.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(etag, compute_etag(b"test data"));
        assert_ne!(etag, compute_etag(b"other data"));
    }

    #[test]
    fn describe_fills_receipt() {
        let info = describe("BCDFGHJKLM", b"abcd");
        assert_eq!(info.key, "BCDFGHJKLM");
        assert_eq!(info.size, 4);
        assert_eq!(info.http_etag, format!("\"{}\"", info.etag));
        assert_eq!(info.version.len(), 32);
    }

    #[test]
    fn key_validation() {
        assert!(validate_key("BCDFGHJKLM").is_ok());
        assert!(validate_key("with-dash_and_underscore").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("name.json").is_err());
    }
}
