//! Period comparison: percentage deltas and the date windows they compare.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::analytics::{ComparisonResult, DateRange, MetricTotals, WeeklyTotals, SUPPORTED_YEARS};
use crate::error::CoreError;

/// Percentage change from `previous` to `current`.
///
/// A zero baseline reports `100` for any increase and `0` otherwise, so the
/// result is always finite.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous != 0.0 {
        (current - previous) / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// A named set of numeric metrics that can be compared period to period.
pub trait MetricSet {
    fn metric_values(&self) -> Vec<(&'static str, f64)>;
}

impl MetricSet for MetricTotals {
    fn metric_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("users", self.users as f64),
            ("new_users", self.new_users as f64),
            ("sessions", self.sessions as f64),
            ("pageviews", self.pageviews as f64),
            ("conversions", self.conversions as f64),
            ("bounce_rate", self.bounce_rate),
            ("engagement_rate", self.engagement_rate),
            ("avg_session_duration", self.avg_session_duration),
        ]
    }
}

impl MetricSet for WeeklyTotals {
    fn metric_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("users", self.users as f64),
            ("new_users", self.new_users as f64),
            ("sessions", self.sessions as f64),
            ("pageviews", self.pageviews as f64),
            ("conversions", self.conversions as f64),
            ("form_submissions", self.form_submissions as f64),
            ("phone_calls", self.phone_calls as f64),
            ("bounce_rate", self.bounce_rate),
            ("engagement_rate", self.engagement_rate),
            ("avg_session_duration", self.avg_session_duration),
            ("clicks", self.clicks as f64),
            ("impressions", self.impressions as f64),
            ("ctr", self.ctr),
            ("click_to_lead_rate", self.click_to_lead_rate),
        ]
    }
}

pub fn changes<T: MetricSet>(current: &T, previous: &T) -> BTreeMap<String, f64> {
    let previous: BTreeMap<&str, f64> = previous.metric_values().into_iter().collect();
    current
        .metric_values()
        .into_iter()
        .map(|(name, value)| {
            let before = previous.get(name).copied().unwrap_or(0.0);
            (name.to_string(), percent_change(value, before))
        })
        .collect()
}

pub fn compare<T: MetricSet>(current: T, previous: T) -> ComparisonResult<T> {
    let changes = changes(&current, &previous);
    ComparisonResult {
        current,
        previous,
        changes,
    }
}

/// The last complete Monday–Sunday week as of `today`. On a Sunday the week
/// ending today counts as complete.
pub fn last_complete_week(today: NaiveDate) -> DateRange {
    let since_sunday = i64::from(today.weekday().num_days_from_sunday());
    let end = today - Duration::days(since_sunday);
    let start = end - Duration::days(6);
    DateRange::from_dates(start, end)
}

/// The same-length window immediately before `range`.
pub fn previous_period(range: &DateRange) -> Result<DateRange, CoreError> {
    let (start, end) = range.iso_bounds()?;
    let days = (end - start).num_days() + 1;
    let prev_end = shifted(start, start.checked_sub_signed(Duration::days(1)))?;
    let prev_start = shifted(start, prev_end.checked_sub_signed(Duration::days(days - 1)))?;
    Ok(DateRange::from_dates(prev_start, prev_end))
}

fn one_year_back(date: NaiveDate) -> Result<NaiveDate, CoreError> {
    // Clamps 29 February to 28 February.
    shifted(date, date.checked_sub_months(Months::new(12)))
}

/// A shifted bound must stay inside the years the API accepts.
fn shifted(origin: NaiveDate, result: Option<NaiveDate>) -> Result<NaiveDate, CoreError> {
    result
        .filter(|d| SUPPORTED_YEARS.contains(&d.year()))
        .ok_or_else(|| CoreError::OutOfRange(origin.to_string()))
}

/// Both bounds moved back one calendar year (not 52 weeks), so the weekday
/// alignment can drift.
pub fn same_range_last_year(range: &DateRange) -> Result<DateRange, CoreError> {
    let (start, end) = range.iso_bounds()?;
    Ok(DateRange::from_dates(one_year_back(start)?, one_year_back(end)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    #[test]
    fn zero_baseline_policy() {
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        assert_eq!(percent_change(5.0, 0.0), 100.0);
        assert_eq!(percent_change(50.0, 100.0), -50.0);
        assert_eq!(percent_change(150.0, 100.0), 50.0);
        assert_eq!(percent_change(-3.0, 0.0), 0.0);
    }

    #[test]
    fn compare_reports_every_metric() {
        let current = MetricTotals {
            sessions: 150,
            users: 0,
            conversions: 5,
            bounce_rate: 40.0,
            ..Default::default()
        };
        let previous = MetricTotals {
            sessions: 100,
            users: 0,
            conversions: 0,
            bounce_rate: 50.0,
            ..Default::default()
        };
        let result = compare(current, previous);
        assert_eq!(result.changes["sessions"], 50.0);
        assert_eq!(result.changes["users"], 0.0);
        assert_eq!(result.changes["conversions"], 100.0);
        assert_eq!(result.changes["bounce_rate"], -20.0);
        assert_eq!(result.changes.len(), 8);
    }

    #[test]
    fn last_week_on_a_weekday() {
        // Wednesday 2026-02-18 -> Mon 2026-02-09 .. Sun 2026-02-15
        let range = last_complete_week(date(2026, 2, 18));
        assert_eq!(range.start_date, "2026-02-09");
        assert_eq!(range.end_date, "2026-02-15");
    }

    #[test]
    fn last_week_on_a_sunday_ends_today() {
        let range = last_complete_week(date(2026, 2, 15));
        assert_eq!(range.start_date, "2026-02-09");
        assert_eq!(range.end_date, "2026-02-15");
    }

    #[test]
    fn last_week_on_a_monday() {
        let range = last_complete_week(date(2026, 2, 16));
        assert_eq!(range.start_date, "2026-02-09");
        assert_eq!(range.end_date, "2026-02-15");
    }

    #[test]
    fn previous_period_matches_length() {
        let range = DateRange::from_dates(date(2026, 2, 9), date(2026, 2, 15));
        let prev = previous_period(&range).expect("previous");
        assert_eq!(prev.start_date, "2026-02-02");
        assert_eq!(prev.end_date, "2026-02-08");
    }

    #[test]
    fn last_year_shifts_by_calendar_year() {
        let range = DateRange::from_dates(date(2026, 2, 9), date(2026, 2, 15));
        let shifted = same_range_last_year(&range).expect("shift");
        assert_eq!(shifted.start_date, "2025-02-09");
        assert_eq!(shifted.end_date, "2025-02-15");

        let leap = DateRange::from_dates(date(2024, 2, 26), date(2024, 3, 3));
        let shifted = same_range_last_year(&leap).expect("shift");
        assert_eq!(shifted.start_date, "2023-02-26");
        assert_eq!(shifted.end_date, "2023-03-03");

        let leap_day = DateRange::from_dates(date(2024, 2, 29), date(2024, 2, 29));
        let shifted = same_range_last_year(&leap_day).expect("shift");
        assert_eq!(shifted.start_date, "2023-02-28");
    }

    #[test]
    fn previous_period_of_two_weeks_spans_two_weeks() {
        let range = DateRange::from_dates(date(2026, 2, 2), date(2026, 2, 15));
        let prev = previous_period(&range).expect("previous");
        assert_eq!(prev.start_date, "2026-01-19");
        assert_eq!(prev.end_date, "2026-02-01");
    }

    #[test]
    fn shifts_before_year_one_are_errors() {
        let first_days = DateRange::from_dates(date(1, 1, 2), date(1, 1, 4));
        assert!(matches!(
            previous_period(&first_days),
            Err(CoreError::OutOfRange(_))
        ));
        assert!(matches!(
            same_range_last_year(&first_days),
            Err(CoreError::OutOfRange(_))
        ));

        let floor = DateRange::from_dates(NaiveDate::MIN, NaiveDate::MIN);
        assert!(previous_period(&floor).is_err());
        assert!(same_range_last_year(&floor).is_err());
    }

    #[test]
    fn relative_ranges_cannot_be_shifted() {
        assert!(same_range_last_year(&DateRange::last_days(7)).is_err());
        assert!(previous_period(&DateRange::last_days(7)).is_err());
    }
}
