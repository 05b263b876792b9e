use anyhow::Result;

use channelscope_core::aggregate::{
    lead_events, lead_totals, LeadCounts, EVENT_DIMENSIONS, EVENT_METRICS,
};
use channelscope_core::analytics::{DateRange, LeadEvent};
use channelscope_core::report::{OrderBy, ReportGateway, ReportRequest};

use super::run;

fn events_request(range: &DateRange) -> ReportRequest {
    ReportRequest::new(range, &EVENT_DIMENSIONS, &EVENT_METRICS)
        .order_by(OrderBy::MetricDesc("eventCount".to_string()))
}

/// Form and phone lead totals for `range`.
pub async fn fetch_lead_counts(gateway: &dyn ReportGateway, range: &DateRange) -> Result<LeadCounts> {
    let rows = run(gateway, &events_request(range), "lead events").await?;
    Ok(lead_totals(&rows))
}

#[tracing::instrument(skip(gateway))]
pub async fn get_lead_events_inner(
    gateway: &dyn ReportGateway,
    range: &DateRange,
) -> Result<Vec<LeadEvent>> {
    let rows = run(gateway, &events_request(range), "lead events").await?;
    Ok(lead_events(&rows))
}
