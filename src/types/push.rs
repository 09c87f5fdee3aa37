use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::notice::Notice;

#[derive(Debug, Clone)]
pub struct VapidConfig {
    pub private_key: String,
    pub public_key: String,
    pub subject: String,
}

/// Key material from the browser's `PushSubscription`. Forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A browser push registration. `endpoint` is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub endpoint: String,
    #[serde(default)]
    pub expiration_time: Option<serde_json::Number>,
    pub keys: SubscriptionKeys,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub subscribed_at: Option<OffsetDateTime>,
}

/// What the service worker receives in the push message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub require_interaction: bool,
    pub data: NotificationData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationData {
    pub url: String,
    pub notices: Vec<Notice>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The push service reported the endpoint as gone (404/410).
    Expired,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
    pub expired: usize,
    pub remaining: usize,
}

impl DispatchReport {
    pub(crate) fn record(&mut self, outcome: DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered => self.delivered += 1,
            DeliveryOutcome::Expired => self.expired += 1,
            DeliveryOutcome::Failed => self.failed += 1,
        }
    }
}
