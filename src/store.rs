mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use crate::config;
use crate::error::StorageError;
use crate::ports::{SnapshotStore, SubscriptionRegistry};

use std::sync::Arc;

pub struct Stores {
    pub snapshots: Arc<dyn SnapshotStore>,
    pub subscriptions: Arc<dyn SubscriptionRegistry>,
}

impl Stores {
    /// File-backed when a data dir is configured, in-memory otherwise.
    pub fn open(config: &config::AppConfig) -> Result<Self, StorageError> {
        match config.data_dir.as_ref() {
            Some(dir) => {
                let store = Arc::new(JsonFileStore::open(dir)?);
                tracing::info!(data_dir = %dir.display(), "using json file store");
                Ok(Self::shared(store))
            }
            None => {
                tracing::warn!(
                    "no data dir configured; notices and subscriptions are kept in memory"
                );
                Ok(Self::shared(Arc::new(MemoryStore::default())))
            }
        }
    }

    pub fn shared<T: SnapshotStore + SubscriptionRegistry>(store: Arc<T>) -> Self {
        Self {
            snapshots: Arc::clone(&store) as Arc<dyn SnapshotStore>,
            subscriptions: store,
        }
    }
}
