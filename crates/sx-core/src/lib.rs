//! sx-core: shared types, ids, errors, and configuration.
//!
//! This crate is the foundational dependency for the other sx-* crates,
//! providing the image id type and its generator, the metadata record, a
//! unified error type, and application configuration.

pub mod config;
pub mod error;
pub mod ids;
pub mod metadata;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
pub use metadata::*;
