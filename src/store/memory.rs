use crate::error::StorageError;
use crate::ports::{SnapshotStore, SubscriptionRegistry};
use crate::types::notice::Snapshot;
use crate::types::push::Subscription;

use std::sync::Mutex;

/// In-process store. Contents live as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Snapshot>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Snapshot, StorageError> {
        let guard = self.snapshot.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let mut guard = self.snapshot.lock().map_err(|_| StorageError::Poisoned)?;
        *guard = snapshot.clone();
        Ok(())
    }
}

impl SubscriptionRegistry for MemoryStore {
    fn list(&self) -> Result<Vec<Subscription>, StorageError> {
        let guard = self
            .subscriptions
            .lock()
            .map_err(|_| StorageError::Poisoned)?;
        Ok(guard.clone())
    }

    fn replace_all(&self, subscriptions: &[Subscription]) -> Result<(), StorageError> {
        let mut guard = self
            .subscriptions
            .lock()
            .map_err(|_| StorageError::Poisoned)?;
        *guard = subscriptions.to_vec();
        Ok(())
    }
}
