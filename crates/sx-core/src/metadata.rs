//! Records persisted for every uploaded image.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::ImageId;

/// What the object store reports after writing a body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    /// Object key (the image id).
    pub key: String,
    /// Random version tag assigned on write.
    pub version: String,
    /// Body length in bytes.
    pub size: u64,
    /// Content digest (hex).
    pub etag: String,
    /// `etag` quoted for use in an HTTP `ETag` header.
    pub http_etag: String,
    /// When the body was written.
    pub uploaded: DateTime<Utc>,
}

/// Metadata record for one uploaded image.
///
/// Stored as JSON in the metadata store under `id`. Records are never updated
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ImageMetadata {
    /// Key shared by this record and the stored object.
    pub id: ImageId,
    /// Result of the object-store write.
    #[serde(rename = "r2")]
    pub object: ObjectInfo,
    /// MIME type declared by the uploaded part.
    #[serde(rename = "type")]
    pub content_type: String,
    /// SHA-1 of the body, lower-case hex.
    pub hash: String,
    /// Public read URL.
    pub url: String,
    /// API URL that deletes this image.
    pub delete: String,
}

impl ImageMetadata {
    /// Encode for the metadata store.
    pub fn to_wire(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a value read back from the metadata store.
    pub fn from_wire(wire: &str) -> Result<Self> {
        Ok(serde_json::from_str(wire)?)
    }
}
