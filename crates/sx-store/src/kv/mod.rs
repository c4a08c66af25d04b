//! Key-value metadata store.
//!
//! Values are opaque strings (the JSON wire form of a metadata record). Keys
//! list in ascending byte order and page through an opaque cursor.

mod memory;
mod sqlite;

pub use memory::MemoryMetadataStore;
pub use sqlite::SqliteMetadataStore;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sx_core::{Error, Result};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIST_LIMIT: usize = 1000;

/// Largest page a single list call returns.
pub const MAX_LIST_LIMIT: usize = 1000;

/// Parameters for [`MetadataStore::list`].
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Cursor from a previous incomplete listing.
    pub cursor: Option<String>,
    /// Requested page size, clamped to `1..=MAX_LIST_LIMIT`.
    pub limit: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            cursor: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ListOptions {
    pub(crate) fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIST_LIMIT)
    }

    /// Key the page starts after, if any.
    pub(crate) fn start_after(&self) -> Result<Option<String>> {
        self.cursor.as_deref().map(decode_cursor).transpose()
    }
}

/// One key in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub name: String,
}

/// One page of keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyListing {
    pub keys: Vec<KeyEntry>,
    /// `true` when no keys follow this page.
    pub list_complete: bool,
    /// Pass back in [`ListOptions::cursor`] to fetch the next page. Only set
    /// when `list_complete` is `false`.
    pub cursor: Option<String>,
}

impl KeyListing {
    /// Build a page from up to `limit + 1` ordered keys; the extra key only
    /// signals that more remain.
    pub(crate) fn from_overfetch(mut names: Vec<String>, limit: usize) -> Self {
        let list_complete = names.len() <= limit;
        names.truncate(limit);
        let cursor = if list_complete {
            None
        } else {
            names.last().map(|last| encode_cursor(last))
        };
        Self {
            keys: names.into_iter().map(|name| KeyEntry { name }).collect(),
            list_complete,
            cursor,
        }
    }
}

/// External key-value service holding JSON records keyed by image id.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Fetch a value, `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite a value.
    async fn put(&self, key: &str, value: String) -> Result<()>;

    /// Remove a key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// List one page of keys in ascending order.
    async fn list(&self, options: ListOptions) -> Result<KeyListing>;
}

fn encode_cursor(last_key: &str) -> String {
    URL_SAFE_NO_PAD.encode(last_key.as_bytes())
}

fn decode_cursor(cursor: &str) -> Result<String> {
    URL_SAFE_NO_PAD
        .decode(cursor)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| Error::Validation("Invalid list cursor.".into()))
}
