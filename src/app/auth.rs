use crate::auth::API_KEY_HEADER;
use crate::state;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

pub(crate) async fn api_key_middleware<S, T>(
    State(state): State<state::AppState<S, T>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    S: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    if !requires_api_key(req.method(), req.uri().path()) {
        return next.run(req).await;
    }

    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    match state.api_key.verify(presented) {
        Ok(()) => next.run(req).await,
        Err(err) => {
            tracing::warn!(path = %req.uri().path(), "rejected request without valid api key");
            err.into_response()
        }
    }
}

fn requires_api_key(method: &Method, path: &str) -> bool {
    *method == Method::POST && (path == "/api/notices" || path == "/api/trigger-push")
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn requires_api_key__should_guard_only_writer_routes() {
        // Then
        assert!(requires_api_key(&Method::POST, "/api/notices"));
        assert!(requires_api_key(&Method::POST, "/api/trigger-push"));
        assert!(!requires_api_key(&Method::GET, "/api/notices"));
        assert!(!requires_api_key(&Method::POST, "/api/subscribe"));
        assert!(!requires_api_key(&Method::GET, "/health"));
    }
}
