//! Shared application state.

use crate::config::Config;
use crate::storage::{MemStorage, Storage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration.
    pub config: Arc<Config>,
    /// Record store.
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    /// Create application state backed by in-memory storage.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            storage: Arc::new(MemStorage::new()),
        }
    }

    /// Randomness source for one engine run.
    ///
    /// With a configured seed the generator is derived from the seed
    /// and the file id, so re-uploading the same file under the same
    /// id reproduces the full analytics output. Without a seed it
    /// draws from OS entropy.
    pub fn engine_rng(&self, file_id: i64) -> StdRng {
        match self.config.engine.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(file_id as u64)),
            None => StdRng::from_entropy(),
        }
    }
}
