use anyhow::Result;
use tracing::info;

use channelscope_core::analytics::{AnomalyResult, DateRange};
use channelscope_core::anomaly::{detect_anomalies, DailyMetric, LOOKBACK_DAYS};
use channelscope_core::report::ReportGateway;

use super::overview::fetch_daily;

/// Days `LOOKBACK_DAYS` ago through yesterday; today is still partial.
pub fn lookback_range() -> DateRange {
    DateRange {
        start_date: format!("{LOOKBACK_DAYS}daysAgo"),
        end_date: "yesterday".to_string(),
    }
}

#[tracing::instrument(skip(gateway))]
pub async fn detect_anomalies_inner(
    gateway: &dyn ReportGateway,
    metric: DailyMetric,
    threshold: f64,
) -> Result<AnomalyResult> {
    let daily = fetch_daily(gateway, &lookback_range()).await?;
    let result = detect_anomalies(&metric.series(&daily), threshold);
    if result.has_anomaly {
        info!(
            metric = metric.slug(),
            count = result.anomalies.len(),
            threshold,
            "anomalies detected"
        );
    }
    Ok(result)
}
