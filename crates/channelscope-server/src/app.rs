use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{routes, state::AppState};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(values))
}

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `CorsLayer`: any origin unless `CHANNELSCOPE_CORS_ORIGINS` lists them.
/// 2. `TraceLayer`: structured request/response logging via `tracing`.
/// 3. `CompressionLayer`: gzip for the larger report payloads.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/overview", get(routes::analytics::get_overview))
        .route("/api/sources", get(routes::analytics::get_sources))
        .route("/api/pages", get(routes::analytics::get_pages))
        .route("/api/channels", get(routes::analytics::get_channels))
        .route("/api/breakdown", get(routes::analytics::get_breakdown))
        .route("/api/weekly", get(routes::analytics::get_weekly))
        .route("/api/compare", get(routes::compare::compare_periods))
        .route("/api/anomalies", get(routes::analytics::get_anomalies))
        .route("/api/leads", get(routes::analytics::get_leads))
        .route("/api/tools", get(routes::tools::list_tools))
        .route("/api/tools/call", post(routes::tools::call_tool))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
