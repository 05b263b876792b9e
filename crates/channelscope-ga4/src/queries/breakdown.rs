use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

use channelscope_core::aggregate::{breakdown, category_summary};
use channelscope_core::analytics::{BreakdownReport, DateRange};
use channelscope_core::compare::last_complete_week;
use channelscope_core::report::ReportGateway;

use super::sources::get_traffic_sources_inner;

/// Every source in `range` grouped by category. Without a range the last
/// complete week as of `today` is used.
#[tracing::instrument(skip(gateway))]
pub async fn get_breakdown_inner(
    gateway: &dyn ReportGateway,
    range: Option<&DateRange>,
    today: NaiveDate,
) -> Result<BreakdownReport> {
    let date_range = range
        .cloned()
        .unwrap_or_else(|| last_complete_week(today));
    let sources = get_traffic_sources_inner(gateway, &date_range, None).await?;
    let breakdown = breakdown(sources);
    let summary = category_summary(&breakdown);
    debug!(%date_range, sources = breakdown.len(), "breakdown computed");
    Ok(BreakdownReport {
        date_range,
        breakdown,
        summary,
    })
}
