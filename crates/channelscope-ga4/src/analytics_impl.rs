use async_trait::async_trait;
use chrono::Utc;

use channelscope_core::analytics::{
    AnalyticsBackend, AnomalyResult, BreakdownReport, ChannelMetrics, DateRange, LeadEvent,
    OverviewResult, PageMetrics, PeriodComparison, SourceMetrics, WeeklyReport,
};
use channelscope_core::anomaly::DailyMetric;

use crate::queries;
use crate::Ga4Analytics;

#[async_trait]
impl AnalyticsBackend for Ga4Analytics {
    async fn get_overview(&self, range: &DateRange) -> anyhow::Result<OverviewResult> {
        queries::overview::get_overview_inner(self.gateway(), range).await
    }

    async fn get_traffic_sources(
        &self,
        range: &DateRange,
        limit: u32,
    ) -> anyhow::Result<Vec<SourceMetrics>> {
        queries::sources::get_traffic_sources_inner(self.gateway(), range, Some(limit)).await
    }

    async fn get_top_pages(
        &self,
        range: &DateRange,
        limit: u32,
    ) -> anyhow::Result<Vec<PageMetrics>> {
        queries::pages::get_top_pages_inner(self.gateway(), range, limit).await
    }

    async fn get_channels(&self, range: &DateRange) -> anyhow::Result<Vec<ChannelMetrics>> {
        queries::channels::get_channels_inner(self.gateway(), range).await
    }

    async fn get_breakdown(&self, range: Option<&DateRange>) -> anyhow::Result<BreakdownReport> {
        let today = Utc::now().date_naive();
        queries::breakdown::get_breakdown_inner(self.gateway(), range, today).await
    }

    async fn get_weekly_report(&self, range: Option<&DateRange>) -> anyhow::Result<WeeklyReport> {
        let today = Utc::now().date_naive();
        queries::weekly::get_weekly_report_inner(self.gateway(), range, today).await
    }

    async fn compare_periods(
        &self,
        current: &DateRange,
        previous: &DateRange,
    ) -> anyhow::Result<PeriodComparison> {
        queries::weekly::compare_periods_inner(self.gateway(), current, previous).await
    }

    async fn detect_anomalies(
        &self,
        metric: DailyMetric,
        threshold: f64,
    ) -> anyhow::Result<AnomalyResult> {
        queries::anomalies::detect_anomalies_inner(self.gateway(), metric, threshold).await
    }

    async fn get_lead_events(&self, range: &DateRange) -> anyhow::Result<Vec<LeadEvent>> {
        queries::leads::get_lead_events_inner(self.gateway(), range).await
    }
}
