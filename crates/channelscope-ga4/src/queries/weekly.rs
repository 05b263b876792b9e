use anyhow::Result;
use chrono::NaiveDate;
use tracing::{info, warn};

use channelscope_core::aggregate::{
    aggregate_daily, search_console_totals, weekly_totals, SearchConsoleTotals, DAILY_DIMENSIONS,
    DAILY_METRICS, SEARCH_CONSOLE_METRICS,
};
use channelscope_core::analytics::{
    DateRange, PeriodComparison, WeeklyPeriod, WeeklyReport, WeeklyTotals,
};
use channelscope_core::compare::{
    changes, compare, last_complete_week, previous_period, same_range_last_year,
};
use channelscope_core::report::{ReportGateway, ReportRequest};

use super::leads::fetch_lead_counts;
use super::run;

/// Search-console clicks and impressions, or `None` when the property has no
/// linked search data or the query fails.
async fn search_console(
    gateway: &dyn ReportGateway,
    range: &DateRange,
) -> Option<SearchConsoleTotals> {
    let request = ReportRequest::new(range, &[], &SEARCH_CONSOLE_METRICS);
    match gateway.run_report(&request).await {
        Ok(rows) => Some(search_console_totals(&rows)),
        Err(e) => {
            warn!(%range, error = %e, "search console data unavailable, using zeros");
            None
        }
    }
}

/// Totals for one period: daily metrics, lead events and the optional
/// search-console query, fetched concurrently.
pub async fn fetch_weekly_totals(
    gateway: &dyn ReportGateway,
    range: &DateRange,
) -> Result<WeeklyTotals> {
    let daily_request = ReportRequest::new(range, &DAILY_DIMENSIONS, &DAILY_METRICS);

    let (daily_rows, leads, search) = tokio::try_join!(
        run(gateway, &daily_request, "daily"),
        fetch_lead_counts(gateway, range),
        async { Ok::<_, anyhow::Error>(search_console(gateway, range).await) },
    )?;

    let daily = aggregate_daily(&daily_rows);
    Ok(weekly_totals(&daily, leads, search))
}

/// Current week against the week before and the same dates one year back.
#[tracing::instrument(skip(gateway))]
pub async fn get_weekly_report_inner(
    gateway: &dyn ReportGateway,
    range: Option<&DateRange>,
    today: NaiveDate,
) -> Result<WeeklyReport> {
    let current_range = range
        .cloned()
        .unwrap_or_else(|| last_complete_week(today));
    let previous_range = previous_period(&current_range)?;
    let last_year_range = same_range_last_year(&current_range)?;

    let (current, previous, last_year) = tokio::try_join!(
        fetch_weekly_totals(gateway, &current_range),
        fetch_weekly_totals(gateway, &previous_range),
        fetch_weekly_totals(gateway, &last_year_range),
    )?;

    let week_over_week = changes(&current, &previous);
    let year_over_year = changes(&current, &last_year);
    info!(
        range = %current_range,
        sessions = current.sessions,
        conversions = current.conversions,
        "weekly report computed"
    );

    Ok(WeeklyReport {
        current: WeeklyPeriod {
            date_range: current_range,
            totals: current,
        },
        previous: WeeklyPeriod {
            date_range: previous_range,
            totals: previous,
        },
        last_year: WeeklyPeriod {
            date_range: last_year_range,
            totals: last_year,
        },
        week_over_week,
        year_over_year,
    })
}

#[tracing::instrument(skip(gateway))]
pub async fn compare_periods_inner(
    gateway: &dyn ReportGateway,
    current_range: &DateRange,
    previous_range: &DateRange,
) -> Result<PeriodComparison> {
    let (current, previous) = tokio::try_join!(
        fetch_weekly_totals(gateway, current_range),
        fetch_weekly_totals(gateway, previous_range),
    )?;
    Ok(PeriodComparison {
        current_range: current_range.clone(),
        previous_range: previous_range.clone(),
        result: compare(current, previous),
    })
}
