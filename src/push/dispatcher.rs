use crate::ports::{PushSender, SubscriptionRegistry, TimeProvider};
use crate::push::payload::build_notification;
use crate::types::notice::{Notice, NoticeExposure};
use crate::types::push::{DeliveryOutcome, DispatchReport, Subscription};

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Fans one notification out to every registered subscription and prunes the
/// endpoints the push service reports as gone.
#[derive(Clone)]
pub struct PushDispatcher<S, T> {
    sender: S,
    time: T,
    registry: Arc<dyn SubscriptionRegistry>,
    timeout: Duration,
    exposure: NoticeExposure,
}

impl<S, T> PushDispatcher<S, T>
where
    S: PushSender,
    T: TimeProvider,
{
    pub fn new(
        sender: S,
        time: T,
        registry: Arc<dyn SubscriptionRegistry>,
        timeout: Duration,
        exposure: NoticeExposure,
    ) -> Self {
        Self {
            sender,
            time,
            registry,
            timeout,
            exposure,
        }
    }

    /// Never fails; every problem ends up in the report counts or the log.
    pub async fn dispatch(&self, new_notices: &[Notice]) -> DispatchReport {
        if new_notices.is_empty() {
            return DispatchReport::default();
        }

        let subscriptions = match self.registry.list() {
            Ok(subscriptions) => subscriptions,
            Err(err) => {
                error!(error = %err, "push dispatch skipped: cannot list subscriptions");
                return DispatchReport::default();
            }
        };
        if subscriptions.is_empty() {
            info!(new_notices = new_notices.len(), "no subscriptions to notify");
            return DispatchReport::default();
        }

        let notices = self.exposure.apply(new_notices);
        let payload = build_notification(&notices, self.time.now_unix_millis());
        let message: Arc<str> = match serde_json::to_string(&payload) {
            Ok(message) => message.into(),
            Err(err) => {
                error!(error = %err, "push dispatch skipped: cannot encode payload");
                return DispatchReport {
                    failed: subscriptions.len(),
                    remaining: subscriptions.len(),
                    ..DispatchReport::default()
                };
            }
        };

        info!(
            new_notices = new_notices.len(),
            subscriptions = subscriptions.len(),
            "dispatching push notification"
        );

        let attempts = subscriptions.iter().cloned().map(|subscription| {
            let sender = self.sender.clone();
            let time = self.time.clone();
            let message = Arc::clone(&message);
            let timeout = self.timeout;
            tokio::spawn(async move {
                deliver(&sender, &time, &subscription, &message, timeout).await
            })
        });
        let results = join_all(attempts).await;

        let mut report = DispatchReport::default();
        let mut expired = HashSet::new();
        for (subscription, result) in subscriptions.iter().zip(results) {
            let outcome = result.unwrap_or_else(|err| {
                warn!(endpoint = %subscription.endpoint, error = %err, "push attempt aborted");
                DeliveryOutcome::Failed
            });
            if outcome == DeliveryOutcome::Expired {
                expired.insert(subscription.endpoint.as_str());
            }
            report.record(outcome);
        }
        report.remaining = self.prune(&expired, subscriptions.len());

        info!(
            delivered = report.delivered,
            failed = report.failed,
            expired = report.expired,
            remaining = report.remaining,
            "push dispatch finished"
        );
        report
    }

    /// Drops expired endpoints with a single write. Returns the registry size afterwards.
    fn prune(&self, expired: &HashSet<&str>, listed: usize) -> usize {
        if expired.is_empty() {
            return listed;
        }
        // Re-read so subscriptions added during the fan-out survive the write-back.
        let current = match self.registry.list() {
            Ok(current) => current,
            Err(err) => {
                error!(error = %err, "cannot prune expired subscriptions");
                return listed;
            }
        };
        let before = current.len();
        let survivors: Vec<Subscription> = current
            .into_iter()
            .filter(|subscription| !expired.contains(subscription.endpoint.as_str()))
            .collect();
        match self.registry.replace_all(&survivors) {
            Ok(()) => {
                info!(
                    removed = before - survivors.len(),
                    "pruned expired subscriptions"
                );
                survivors.len()
            }
            Err(err) => {
                error!(error = %err, "cannot prune expired subscriptions");
                before
            }
        }
    }
}

async fn deliver<S, T>(
    sender: &S,
    time: &T,
    subscription: &Subscription,
    message: &str,
    timeout: Duration,
) -> DeliveryOutcome
where
    S: PushSender,
    T: TimeProvider,
{
    tokio::select! {
        biased;
        result = sender.send(subscription, message) => match result {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(err) if S::is_expired(&err) => {
                info!(endpoint = %subscription.endpoint, "push endpoint expired");
                DeliveryOutcome::Expired
            }
            Err(err) => {
                warn!(endpoint = %subscription.endpoint, error = %err, "push delivery failed");
                DeliveryOutcome::Failed
            }
        },
        () = time.sleep(timeout) => {
            warn!(endpoint = %subscription.endpoint, ?timeout, "push delivery timed out");
            DeliveryOutcome::Failed
        }
    }
}
