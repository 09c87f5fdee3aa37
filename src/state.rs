use crate::auth::ApiKey;
use crate::config::AppConfig;
use crate::ports::{SnapshotStore, SubscriptionRegistry};
use crate::push::PushDispatcher;

use std::sync::Arc;

/// Process-wide state, built once at startup and shared by every request.
#[derive(Clone)]
pub(crate) struct AppState<S, T> {
    pub(crate) config: AppConfig,
    pub(crate) api_key: ApiKey,
    pub(crate) snapshots: Arc<dyn SnapshotStore>,
    pub(crate) subscriptions: Arc<dyn SubscriptionRegistry>,
    pub(crate) dispatcher: Option<PushDispatcher<S, T>>,
    pub(crate) time: T,
}
