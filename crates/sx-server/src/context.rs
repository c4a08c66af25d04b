//! Shared application context.
//!
//! [`AppContext`] is handed to every route handler through Axum state. It
//! carries the configuration and the two stores behind trait objects, so tests
//! can swap in memory backends and a deterministic id generator.

use std::sync::Arc;

use sx_core::config::Config;
use sx_core::{AlphabetIdGenerator, IdGenerator};
use sx_store::{MetadataStore, ObjectStore};

/// Central application context shared across all handlers.
#[derive(Clone)]
pub struct AppContext {
    /// Static configuration loaded at startup.
    pub config: Arc<Config>,
    /// JSON metadata records keyed by image id.
    pub metadata: Arc<dyn MetadataStore>,
    /// Raw upload bodies keyed by image id.
    pub objects: Arc<dyn ObjectStore>,
    /// Mints ids for new uploads.
    pub ids: Arc<dyn IdGenerator>,
}

impl AppContext {
    /// Build a context with the default random id generator.
    pub fn new(
        config: Config,
        metadata: Arc<dyn MetadataStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            metadata,
            objects,
            ids: Arc::new(AlphabetIdGenerator::default()),
        }
    }

    /// Replace the id generator.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
