use crate::adapters::{TokioTimeProvider, WebPushSender};
use crate::config;
use crate::ports::SubscriptionRegistry;

mod dispatcher;
mod payload;
pub(crate) mod vapid;

use std::sync::Arc;

pub use dispatcher::PushDispatcher;
pub use vapid::{VapidCredentials, generate_vapid_credentials};
pub(crate) use vapid::{VapidConfigStatus, load_vapid_config};

#[cfg(test)]
pub(crate) use dispatcher::tests as testing;

/// Builds the web-push dispatcher, or `None` when push is not configured.
pub fn maybe_build_dispatcher(
    config: &config::AppConfig,
    registry: Arc<dyn SubscriptionRegistry>,
) -> Option<PushDispatcher<WebPushSender, TokioTimeProvider>> {
    let vapid = match load_vapid_config(config) {
        VapidConfigStatus::Ready(vapid) => vapid,
        VapidConfigStatus::Incomplete => {
            tracing::warn!("push notifications disabled: incomplete VAPID configuration");
            return None;
        }
        VapidConfigStatus::InvalidSubject => {
            tracing::warn!("push notifications disabled: VAPID subject must be a mailto: or https: URI");
            return None;
        }
        VapidConfigStatus::Missing => {
            tracing::info!("push notifications disabled: no VAPID configuration");
            return None;
        }
    };

    let sender = match WebPushSender::new(vapid) {
        Ok(sender) => sender,
        Err(err) => {
            tracing::warn!(error = %err, "push notifications disabled: failed to init web-push");
            return None;
        }
    };

    Some(PushDispatcher::new(
        sender,
        TokioTimeProvider,
        registry,
        config.push_timeout,
        config.notice_exposure,
    ))
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn maybe_build_dispatcher__should_return_none_without_vapid() {
        // Given
        let config = config::AppConfig::default();
        let registry: Arc<dyn SubscriptionRegistry> = Arc::new(MemoryStore::default());

        // Then
        assert!(maybe_build_dispatcher(&config, Arc::clone(&registry)).is_none());

        let partial = config::AppConfig {
            vapid_subject: Some("mailto:cdc@example.com".to_string()),
            ..Default::default()
        };
        assert!(maybe_build_dispatcher(&partial, registry).is_none());
    }
}
