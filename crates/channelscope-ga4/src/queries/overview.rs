use anyhow::Result;
use tracing::debug;

use channelscope_core::aggregate::{aggregate_daily, totals, DAILY_DIMENSIONS, DAILY_METRICS};
use channelscope_core::analytics::{DateRange, MetricRow, OverviewResult};
use channelscope_core::report::{OrderBy, ReportGateway, ReportRequest};

use super::run;

/// Daily metric rows for `range`, in ascending date order.
pub async fn fetch_daily(gateway: &dyn ReportGateway, range: &DateRange) -> Result<Vec<MetricRow>> {
    let request = ReportRequest::new(range, &DAILY_DIMENSIONS, &DAILY_METRICS)
        .order_by(OrderBy::DimensionAsc("date".to_string()));
    let rows = run(gateway, &request, "daily").await?;
    Ok(aggregate_daily(&rows))
}

#[tracing::instrument(skip(gateway))]
pub async fn get_overview_inner(
    gateway: &dyn ReportGateway,
    range: &DateRange,
) -> Result<OverviewResult> {
    let daily = fetch_daily(gateway, range).await?;
    let totals = totals(&daily);
    debug!(days = daily.len(), sessions = totals.sessions, "overview computed");
    Ok(OverviewResult {
        date_range: range.clone(),
        totals,
        daily,
    })
}
