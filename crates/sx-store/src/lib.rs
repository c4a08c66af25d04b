//! sx-store: the two collaborators behind the image API.
//!
//! - [`MetadataStore`]: key-value store of JSON metadata records, backed by
//!   SQLite (r2d2 pool, embedded migrations) or memory.
//! - [`ObjectStore`]: blob store of raw upload bodies, backed by a local
//!   directory or memory.

pub mod kv;
pub mod migrations;
pub mod object;
pub mod pool;

pub use kv::{
    KeyEntry, KeyListing, ListOptions, MemoryMetadataStore, MetadataStore, SqliteMetadataStore,
};
pub use object::{FsObjectStore, MemoryObjectStore, ObjectStore, StoredObject};
