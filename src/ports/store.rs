//! Storage seams. Each call is atomic on its own; sequences of calls are not.
//!
//! Concurrent writers follow last-write-wins on the whole value. A subscription
//! added between a prune's `list` and its `replace_all` can be lost, and two racing
//! ingestions may both diff against the same previous snapshot.

use crate::error::StorageError;
use crate::types::notice::Snapshot;
use crate::types::push::Subscription;

use time::OffsetDateTime;

pub trait SnapshotStore: Send + Sync + 'static {
    /// Returns the empty snapshot when nothing was ever saved.
    fn load(&self) -> Result<Snapshot, StorageError>;

    /// Replaces the stored snapshot entirely.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError>;
}

pub trait SubscriptionRegistry: Send + Sync + 'static {
    fn list(&self) -> Result<Vec<Subscription>, StorageError>;

    fn replace_all(&self, subscriptions: &[Subscription]) -> Result<(), StorageError>;

    /// Adds unless the endpoint is already registered. Returns the total afterwards.
    fn add(
        &self,
        mut subscription: Subscription,
        subscribed_at: OffsetDateTime,
    ) -> Result<usize, StorageError> {
        let mut subscriptions = self.list()?;
        if subscriptions
            .iter()
            .any(|existing| existing.endpoint == subscription.endpoint)
        {
            return Ok(subscriptions.len());
        }
        subscription.subscribed_at = Some(subscribed_at);
        subscriptions.push(subscription);
        self.replace_all(&subscriptions)?;
        Ok(subscriptions.len())
    }

    /// Removes the endpoint if present. Returns the total afterwards.
    fn remove(&self, endpoint: &str) -> Result<usize, StorageError> {
        let mut subscriptions = self.list()?;
        let before = subscriptions.len();
        subscriptions.retain(|subscription| subscription.endpoint != endpoint);
        if subscriptions.len() != before {
            self.replace_all(&subscriptions)?;
        }
        Ok(subscriptions.len())
    }
}
