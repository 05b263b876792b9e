use anyhow::Result;

use channelscope_core::aggregate::{pages, PAGE_DIMENSIONS, PAGE_METRICS};
use channelscope_core::analytics::{DateRange, PageMetrics};
use channelscope_core::report::{OrderBy, ReportGateway, ReportRequest};

use super::run;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;

#[tracing::instrument(skip(gateway))]
pub async fn get_top_pages_inner(
    gateway: &dyn ReportGateway,
    range: &DateRange,
    limit: u32,
) -> Result<Vec<PageMetrics>> {
    let request = ReportRequest::new(range, &PAGE_DIMENSIONS, &PAGE_METRICS)
        .order_by(OrderBy::MetricDesc("screenPageViews".to_string()))
        .limit(limit);
    let rows = run(gateway, &request, "pages").await?;
    Ok(pages(&rows))
}
