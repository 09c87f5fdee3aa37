use crate::error::ApiError;
use crate::ports::{PushSender, TimeProvider};
use crate::push as push_service;
use crate::state;
use crate::types::notice::Notice;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub(crate) struct PublicKeyResponse {
    #[serde(rename = "publicKey")]
    pub(crate) public_key: String,
}

pub(crate) async fn push_public_key<S, T>(
    State(state): State<state::AppState<S, T>>,
) -> Result<Json<PublicKeyResponse>, ApiError>
where
    S: PushSender,
    T: TimeProvider,
{
    match push_service::load_vapid_config(&state.config) {
        push_service::VapidConfigStatus::Ready(vapid) => Ok(Json(PublicKeyResponse {
            public_key: vapid.public_key,
        })),
        push_service::VapidConfigStatus::Incomplete
        | push_service::VapidConfigStatus::InvalidSubject
        | push_service::VapidConfigStatus::Missing => Err(ApiError::PushUnavailable),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TriggerPushRequest {
    new_notices: Vec<Notice>,
    #[serde(default)]
    count: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TriggerPushResponse {
    pub(crate) success: bool,
    pub(crate) sent: usize,
    pub(crate) failed: usize,
    pub(crate) expired: usize,
    pub(crate) total_subscriptions: usize,
}

/// Pushes a caller-chosen list right away and waits for the fan-out.
pub(crate) async fn trigger_push<S, T>(
    State(state): State<state::AppState<S, T>>,
    body: Bytes,
) -> Result<Json<TriggerPushResponse>, ApiError>
where
    S: PushSender,
    T: TimeProvider,
{
    let request: TriggerPushRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidPayload)?;
    let dispatcher = state
        .dispatcher
        .as_ref()
        .ok_or(ApiError::PushUnavailable)?;

    tracing::info!(
        new_notices = request.new_notices.len(),
        count = ?request.count,
        "manual push triggered"
    );
    let report = dispatcher.dispatch(&request.new_notices).await;

    Ok(Json(TriggerPushResponse {
        success: true,
        sent: report.delivered,
        failed: report.failed,
        expired: report.expired,
        total_subscriptions: report.remaining,
    }))
}
