pub mod analytics;
pub mod compare;
pub mod health;
pub mod tools;

use channelscope_core::analytics::DateRange;
use channelscope_core::config::MAX_REPORT_LIMIT;

use crate::error::AppError;

/// Window used by range-keyed reads when the caller gives no dates.
pub const DEFAULT_RANGE_DAYS: u32 = 28;

/// Validate an optional `start_date`/`end_date` pair.
///
/// `Ok(None)` when both are absent; a lone bound is rejected.
pub fn optional_range(
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<Option<DateRange>, AppError> {
    match (start_date, end_date) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => Ok(Some(DateRange::parse(start, end)?)),
        _ => Err(AppError::BadRequest(
            "start_date and end_date must be given together".to_string(),
        )),
    }
}

/// Like [`optional_range`], falling back to the last [`DEFAULT_RANGE_DAYS`].
pub fn range_or_default(
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<DateRange, AppError> {
    Ok(optional_range(start_date, end_date)?
        .unwrap_or_else(|| DateRange::last_days(DEFAULT_RANGE_DAYS)))
}

pub fn validate_limit(limit: Option<u32>, default: u32) -> Result<u32, AppError> {
    match limit {
        None => Ok(default),
        Some(0) => Err(AppError::BadRequest("limit must be at least 1".to_string())),
        Some(n) if n > MAX_REPORT_LIMIT => Err(AppError::BadRequest(format!(
            "limit must be at most {MAX_REPORT_LIMIT}"
        ))),
        Some(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_range_defaults_to_last_four_weeks() {
        let range = range_or_default(None, None).expect("range");
        assert_eq!(range.start_date, "28daysAgo");
        assert_eq!(range.end_date, "today");
    }

    #[test]
    fn lone_bound_is_rejected() {
        assert!(optional_range(Some("2026-02-01"), None).is_err());
        assert!(optional_range(None, Some("today")).is_err());
    }

    #[test]
    fn limit_bounds() {
        assert_eq!(validate_limit(None, 50).expect("default"), 50);
        assert_eq!(validate_limit(Some(5), 50).expect("explicit"), 5);
        assert!(validate_limit(Some(0), 50).is_err());
        assert!(validate_limit(Some(20_000), 50).is_err());
    }
}
