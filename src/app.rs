use crate::adapters::TokioTimeProvider;
use crate::auth as auth_service;
use crate::config;
use crate::error::StorageError;
use crate::ports::{PushSender, TimeProvider};
use crate::push as push_service;
use crate::state;
use crate::store::Stores;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use std::sync::Arc;

mod auth;
mod notices;
mod push;
mod subscribe;

pub fn app(config: config::AppConfig) -> Result<Router, StorageError> {
    let stores = Stores::open(&config)?;
    let api_key = auth_service::ApiKey::from_config(&config);
    if !api_key.is_configured() {
        tracing::warn!("no api key configured; ingest and trigger-push will reject every request");
    }
    let dispatcher =
        push_service::maybe_build_dispatcher(&config, Arc::clone(&stores.subscriptions));
    let state = state::AppState {
        config,
        api_key,
        snapshots: stores.snapshots,
        subscriptions: stores.subscriptions,
        dispatcher,
        time: TokioTimeProvider,
    };
    Ok(router(state))
}

pub(crate) fn router<S, T>(state: state::AppState<S, T>) -> Router
where
    S: PushSender,
    T: TimeProvider,
{
    Router::new()
        .route(
            "/api/notices",
            get(notices::notices_read::<S, T>).post(notices::notices_ingest::<S, T>),
        )
        .route(
            "/api/subscribe",
            post(subscribe::subscribe::<S, T>).delete(subscribe::unsubscribe::<S, T>),
        )
        .route("/api/trigger-push", post(push::trigger_push::<S, T>))
        .route("/api/push/public-key", get(push::push_public_key::<S, T>))
        .route("/health", get(health))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state,
            auth::api_key_middleware::<S, T>,
        ))
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
