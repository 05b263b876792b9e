use anyhow::Result;
use tracing::debug;

use channelscope_core::aggregate::{
    aggregate_sources, EVENT_METRICS, SOURCE_DIMENSIONS, SOURCE_EVENT_DIMENSIONS, TRAFFIC_METRICS,
};
use channelscope_core::analytics::{DateRange, SourceMetrics};
use channelscope_core::report::{OrderBy, ReportGateway, ReportRequest};

use super::run;

/// Categorized source/medium metrics joined with their lead events.
///
/// `limit` caps the traffic query only; `None` returns every source, which
/// the breakdown relies on.
#[tracing::instrument(skip(gateway))]
pub async fn get_traffic_sources_inner(
    gateway: &dyn ReportGateway,
    range: &DateRange,
    limit: Option<u32>,
) -> Result<Vec<SourceMetrics>> {
    let mut traffic_request = ReportRequest::new(range, &SOURCE_DIMENSIONS, &TRAFFIC_METRICS)
        .order_by(OrderBy::MetricDesc("sessions".to_string()));
    if let Some(limit) = limit {
        traffic_request = traffic_request.limit(limit);
    }
    let events_request = ReportRequest::new(range, &SOURCE_EVENT_DIMENSIONS, &EVENT_METRICS);

    let (traffic, events) = tokio::try_join!(
        run(gateway, &traffic_request, "source traffic"),
        run(gateway, &events_request, "source events"),
    )?;

    let sources = aggregate_sources(&traffic, &events);
    debug!(sources = sources.len(), "traffic sources aggregated");
    Ok(sources)
}
