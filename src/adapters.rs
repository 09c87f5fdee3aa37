use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;

use crate::ports;
use crate::types::push::{Subscription, VapidConfig};

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimeProvider;

impl ports::TimeProvider for TokioTimeProvider {
    type Sleep<'a>
        = tokio::time::Sleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
        tokio::time::sleep(duration)
    }
}

/// Delivers through the browser vendors' push services with a VAPID signature.
#[derive(Clone)]
pub struct WebPushSender {
    vapid: Arc<VapidConfig>,
    client: Arc<web_push::WebPushClient>,
}

impl WebPushSender {
    pub fn new(vapid: VapidConfig) -> Result<Self, web_push::WebPushError> {
        let client = web_push::WebPushClient::new()?;
        Ok(Self {
            vapid: Arc::new(vapid),
            client: Arc::new(client),
        })
    }
}

impl WebPushSender {
    /// Encrypts `message` for one browser and signs it with our VAPID key.
    fn signed_message(
        &self,
        subscription: &Subscription,
        message: &str,
    ) -> Result<web_push::WebPushMessage, web_push::WebPushError> {
        let info = web_push::SubscriptionInfo::new(
            subscription.endpoint.clone(),
            subscription.keys.p256dh.clone(),
            subscription.keys.auth.clone(),
        );
        let mut signature = web_push::VapidSignatureBuilder::from_base64(
            &self.vapid.private_key,
            web_push::URL_SAFE_NO_PAD,
            &info,
        )?;
        signature.add_claim("sub", self.vapid.subject.as_str());

        let mut builder = web_push::WebPushMessageBuilder::new(&info)?;
        builder.set_payload(web_push::ContentEncoding::Aes128Gcm, message.as_bytes());
        builder.set_vapid_signature(signature.build()?);
        builder.build()
    }
}

impl ports::PushSender for WebPushSender {
    type Error = web_push::WebPushError;
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<(), Self::Error>> + Send + 'a>>
    where
        Self: 'a;

    fn send<'a>(&'a self, subscription: &'a Subscription, message: &'a str) -> Self::Fut<'a> {
        Box::pin(async move {
            let signed = self.signed_message(subscription, message)?;
            self.client.send(signed).await
        })
    }

    // 404 and 410 from the push service.
    fn is_expired(error: &Self::Error) -> bool {
        matches!(
            error,
            web_push::WebPushError::EndpointNotFound { .. }
                | web_push::WebPushError::EndpointNotValid { .. }
        )
    }
}
