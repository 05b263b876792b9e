use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use channelscope_core::anomaly::DailyMetric;
use channelscope_core::compare::{previous_period, same_range_last_year};
use channelscope_ga4::queries::pages::DEFAULT_PAGE_LIMIT;

use crate::{
    error::AppError,
    routes::{optional_range, range_or_default, validate_limit},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AnomalyQuery {
    pub metric: Option<String>,
    pub threshold: Option<f64>,
}

/// `GET /api/overview` - Daily metrics and period totals.
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = range_or_default(query.start_date.as_deref(), query.end_date.as_deref())?;
    let result = state
        .analytics
        .get_overview(&range)
        .await
        .map_err(AppError::Upstream)?;
    Ok(Json(json!({ "data": result })))
}

/// `GET /api/sources` - Categorized source/medium metrics.
pub async fn get_sources(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = range_or_default(query.start_date.as_deref(), query.end_date.as_deref())?;
    let limit = validate_limit(query.limit, state.config.source_limit)?;
    let result = state
        .analytics
        .get_traffic_sources(&range, limit)
        .await
        .map_err(AppError::Upstream)?;
    Ok(Json(json!({ "data": result })))
}

/// `GET /api/pages` - Most viewed pages.
pub async fn get_pages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = range_or_default(query.start_date.as_deref(), query.end_date.as_deref())?;
    let limit = validate_limit(query.limit, DEFAULT_PAGE_LIMIT)?;
    let result = state
        .analytics
        .get_top_pages(&range, limit)
        .await
        .map_err(AppError::Upstream)?;
    Ok(Json(json!({ "data": result })))
}

/// `GET /api/channels` - Default channel group metrics.
pub async fn get_channels(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = range_or_default(query.start_date.as_deref(), query.end_date.as_deref())?;
    let result = state
        .analytics
        .get_channels(&range)
        .await
        .map_err(AppError::Upstream)?;
    Ok(Json(json!({ "data": result })))
}

/// `GET /api/breakdown` - Sources grouped by category. Defaults to the last
/// complete week.
pub async fn get_breakdown(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = optional_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let result = state
        .analytics
        .get_breakdown(range.as_ref())
        .await
        .map_err(AppError::Upstream)?;
    Ok(Json(json!({ "data": result })))
}

/// `GET /api/weekly` - Week-over-week and year-over-year report.
pub async fn get_weekly(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = optional_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    if let Some(range) = &range {
        // Both shifted windows need calendar dates; reject before any report runs.
        previous_period(range)?;
        same_range_last_year(range)?;
    }
    let result = state
        .analytics
        .get_weekly_report(range.as_ref())
        .await
        .map_err(AppError::Upstream)?;
    Ok(Json(json!({ "data": result })))
}

pub fn resolve_anomaly_query(
    metric: Option<&str>,
    threshold: Option<f64>,
    default_threshold: f64,
) -> Result<(DailyMetric, f64), AppError> {
    let metric = metric
        .map(DailyMetric::parse)
        .transpose()?
        .unwrap_or(DailyMetric::Sessions);
    let threshold = match threshold {
        None => default_threshold,
        Some(t) if t.is_finite() && t > 0.0 => t,
        Some(_) => {
            return Err(AppError::BadRequest(
                "threshold must be a positive number".to_string(),
            ))
        }
    };
    Ok((metric, threshold))
}

/// `GET /api/anomalies` - Z-score outliers over the last 30 days.
pub async fn get_anomalies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnomalyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (metric, threshold) = resolve_anomaly_query(
        query.metric.as_deref(),
        query.threshold,
        state.config.anomaly_threshold,
    )?;
    let result = state
        .analytics
        .detect_anomalies(metric, threshold)
        .await
        .map_err(AppError::Upstream)?;
    Ok(Json(json!({ "data": {
        "metric": metric,
        "result": result,
    } })))
}

/// `GET /api/leads` - Form and phone lead events.
pub async fn get_leads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = range_or_default(query.start_date.as_deref(), query.end_date.as_deref())?;
    let result = state
        .analytics
        .get_lead_events(&range)
        .await
        .map_err(AppError::Upstream)?;
    Ok(Json(json!({ "data": result })))
}
