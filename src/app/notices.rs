use crate::error::ApiError;
use crate::ingest;
use crate::ports::{PushSender, TimeProvider};
use crate::state;
use crate::types::notice::{IngestResult, Notice};

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct NoticesResponse {
    pub(crate) scraped_at: Option<String>,
    pub(crate) total_notices: u64,
    pub(crate) notices: Vec<Notice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

/// Always answers 200 so the UI can render something when storage is down.
pub(crate) async fn notices_read<S, T>(
    State(state): State<state::AppState<S, T>>,
) -> Json<NoticesResponse>
where
    S: PushSender,
    T: TimeProvider,
{
    match state.snapshots.load() {
        Ok(snapshot) => Json(NoticesResponse {
            scraped_at: snapshot.scraped_at,
            total_notices: snapshot.total_notices,
            notices: state.config.notice_exposure.apply(&snapshot.notices),
            error: None,
        }),
        Err(err) => {
            tracing::warn!(error = %err, "serving empty notice list");
            Json(NoticesResponse {
                scraped_at: None,
                total_notices: 0,
                notices: Vec::new(),
                error: Some(err.to_string()),
            })
        }
    }
}

pub(crate) async fn notices_ingest<S, T>(
    State(state): State<state::AppState<S, T>>,
    body: Bytes,
) -> Result<Json<IngestResult>, ApiError>
where
    S: PushSender,
    T: TimeProvider,
{
    let payload = ingest::parse_payload(&body).inspect_err(|err| {
        tracing::warn!(error = %err, "rejected ingest payload");
    })?;
    let outcome = ingest::ingest(
        state.snapshots.as_ref(),
        state.dispatcher.as_ref(),
        &state.time,
        payload,
    )?;
    // The fan-out keeps running after the response is sent.
    drop(outcome.dispatch);
    Ok(Json(outcome.result))
}
