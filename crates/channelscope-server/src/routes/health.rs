use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// `GET /health` - liveness check.
///
/// Does not call the analytics API; a reachable process is healthy.
///
/// Response shape:
/// ```json
/// { "status": "ok", "version": "0.1.0", "property_id": "123456" }
/// ```
#[tracing::instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "property_id": state.config.ga4_property_id,
        })),
    )
}
