use crate::error::ApiError;
use crate::ports::{PushSender, TimeProvider};
use crate::state;
use crate::types::push::{Subscription, SubscriptionKeys};

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscribeRequest {
    endpoint: Option<String>,
    #[serde(default)]
    expiration_time: Option<serde_json::Number>,
    keys: Option<SubscriptionKeys>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UnsubscribeRequest {
    endpoint: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionResponse {
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) total_subscriptions: usize,
}

pub(crate) async fn subscribe<S, T>(
    State(state): State<state::AppState<S, T>>,
    body: Bytes,
) -> Result<Json<SubscriptionResponse>, ApiError>
where
    S: PushSender,
    T: TimeProvider,
{
    let request: SubscribeRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::InvalidSubscription("Invalid subscription"))?;
    let endpoint = required_endpoint(request.endpoint, "Invalid subscription")?;
    let keys = request
        .keys
        .ok_or(ApiError::InvalidSubscription("Invalid subscription"))?;

    let subscription = Subscription {
        endpoint,
        expiration_time: request.expiration_time,
        keys,
        subscribed_at: None,
    };
    let endpoint = subscription.endpoint.clone();
    let total = state.subscriptions.add(subscription, state.time.now())?;
    tracing::info!(%endpoint, total, "subscription registered");

    Ok(Json(SubscriptionResponse {
        success: true,
        message: "Subscription saved".to_string(),
        total_subscriptions: total,
    }))
}

pub(crate) async fn unsubscribe<S, T>(
    State(state): State<state::AppState<S, T>>,
    body: Bytes,
) -> Result<Json<SubscriptionResponse>, ApiError>
where
    S: PushSender,
    T: TimeProvider,
{
    let request: UnsubscribeRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::InvalidSubscription("Endpoint required"))?;
    let endpoint = required_endpoint(request.endpoint, "Endpoint required")?;
    let total = state.subscriptions.remove(&endpoint)?;
    tracing::info!(%endpoint, total, "subscription removed");

    Ok(Json(SubscriptionResponse {
        success: true,
        message: "Subscription removed".to_string(),
        total_subscriptions: total,
    }))
}

fn required_endpoint(endpoint: Option<String>, message: &'static str) -> Result<String, ApiError> {
    match endpoint {
        Some(endpoint) if !endpoint.trim().is_empty() => Ok(endpoint),
        _ => Err(ApiError::InvalidSubscription(message)),
    }
}
