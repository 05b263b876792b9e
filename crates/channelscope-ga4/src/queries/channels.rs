use anyhow::Result;

use channelscope_core::aggregate::{
    aggregate_channels, CHANNEL_DIMENSIONS, CHANNEL_EVENT_DIMENSIONS, EVENT_METRICS,
    TRAFFIC_METRICS,
};
use channelscope_core::analytics::{ChannelMetrics, DateRange};
use channelscope_core::report::{OrderBy, ReportGateway, ReportRequest};

use super::run;

#[tracing::instrument(skip(gateway))]
pub async fn get_channels_inner(
    gateway: &dyn ReportGateway,
    range: &DateRange,
) -> Result<Vec<ChannelMetrics>> {
    let traffic_request = ReportRequest::new(range, &CHANNEL_DIMENSIONS, &TRAFFIC_METRICS)
        .order_by(OrderBy::MetricDesc("sessions".to_string()));
    let events_request = ReportRequest::new(range, &CHANNEL_EVENT_DIMENSIONS, &EVENT_METRICS);

    let (traffic, events) = tokio::try_join!(
        run(gateway, &traffic_request, "channel traffic"),
        run(gateway, &events_request, "channel events"),
    )?;
    Ok(aggregate_channels(&traffic, &events))
}
