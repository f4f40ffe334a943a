use std::{path::Path, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, error};

use crate::app_state::AppState;

pub(crate) const SIGNAL_PARAM: &str = "s";

pub(crate) fn build_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/change", any(change))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn change(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let requested = form_value(&headers, &body)
        .or_else(|| uri.query().and_then(|query| first_signal_param(query.as_bytes())))
        .filter(|s| !s.is_empty());

    let result = match requested.as_deref() {
        Some(name) => state.controller.activate_by_name(name).await,
        None => state.controller.activate_next().await,
    };

    match result {
        Ok(()) => {
            let index = state.controller.current_index().await;
            debug!(index, "selection updated");
            StatusCode::OK.into_response()
        }
        Err(err) => {
            error!(
                requested = requested.as_deref().unwrap_or_default(),
                code = ?err.code(),
                error = %err,
                "signal change failed"
            );
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            (status, status.canonical_reason().unwrap_or_default()).into_response()
        }
    }
}

/// Reads the signal parameter from a url-encoded form body, if there is one.
fn form_value(headers: &HeaderMap, body: &[u8]) -> Option<String> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));
    if !is_form {
        return None;
    }
    first_signal_param(body)
}

/// First value of the signal parameter; later repeats are ignored.
fn first_signal_param(encoded: &[u8]) -> Option<String> {
    url::form_urlencoded::parse(encoded)
        .find(|(key, _)| key == SIGNAL_PARAM)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
