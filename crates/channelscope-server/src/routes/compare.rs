use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use channelscope_core::analytics::DateRange;
use channelscope_core::compare::{last_complete_week, previous_period};

use crate::{error::AppError, routes::optional_range, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct CompareQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub compare_start_date: Option<String>,
    pub compare_end_date: Option<String>,
}

/// Resolve the two windows of a comparison.
///
/// The current window defaults to the last complete week as of `today`; the
/// comparison window defaults to the same-length period right before it,
/// which needs calendar dates.
pub fn resolve_compare_ranges(
    query: &CompareQuery,
    today: NaiveDate,
) -> Result<(DateRange, DateRange), AppError> {
    let current = optional_range(query.start_date.as_deref(), query.end_date.as_deref())?
        .unwrap_or_else(|| last_complete_week(today));
    let previous = match optional_range(
        query.compare_start_date.as_deref(),
        query.compare_end_date.as_deref(),
    )? {
        Some(range) => range,
        None => previous_period(&current)?,
    };
    Ok((current, previous))
}

/// `GET /api/compare` - Weekly totals of two periods with percentage changes.
pub async fn compare_periods(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompareQuery>,
) -> Result<impl IntoResponse, AppError> {
    let today = chrono::Utc::now().date_naive();
    let (current, previous) = resolve_compare_ranges(&query, today)?;

    let result = state
        .analytics
        .compare_periods(&current, &previous)
        .await
        .map_err(AppError::Upstream)?;

    Ok(Json(json!({ "data": result })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 18).expect("date")
    }

    #[test]
    fn defaults_to_last_week_against_the_week_before() {
        let (current, previous) =
            resolve_compare_ranges(&CompareQuery::default(), today()).expect("ranges");
        assert_eq!(current.start_date, "2026-02-09");
        assert_eq!(current.end_date, "2026-02-15");
        assert_eq!(previous.start_date, "2026-02-02");
        assert_eq!(previous.end_date, "2026-02-08");
    }

    #[test]
    fn previous_period_shift_matches_primary_length() {
        let query = CompareQuery {
            start_date: Some("2026-02-10".to_string()),
            end_date: Some("2026-02-20".to_string()),
            ..Default::default()
        };
        let (_, previous) = resolve_compare_ranges(&query, today()).expect("ranges");
        assert_eq!(previous.start_date, "2026-01-30");
        assert_eq!(previous.end_date, "2026-02-09");
    }

    #[test]
    fn explicit_comparison_window_is_kept() {
        let query = CompareQuery {
            start_date: Some("7daysAgo".to_string()),
            end_date: Some("today".to_string()),
            compare_start_date: Some("14daysAgo".to_string()),
            compare_end_date: Some("8daysAgo".to_string()),
        };
        let (current, previous) = resolve_compare_ranges(&query, today()).expect("ranges");
        assert_eq!(current.start_date, "7daysAgo");
        assert_eq!(previous.end_date, "8daysAgo");
    }

    #[test]
    fn relative_window_without_comparison_is_rejected() {
        let query = CompareQuery {
            start_date: Some("7daysAgo".to_string()),
            end_date: Some("today".to_string()),
            ..Default::default()
        };
        let err = resolve_compare_ranges(&query, today()).expect_err("relative");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let query = CompareQuery {
            start_date: Some("2026-02-20".to_string()),
            end_date: Some("2026-02-10".to_string()),
            ..Default::default()
        };
        assert!(resolve_compare_ranges(&query, today()).is_err());
    }
}
