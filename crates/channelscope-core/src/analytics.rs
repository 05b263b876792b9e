//! Analytics read model and backend abstraction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::anomaly::DailyMetric;
use crate::category::Category;
use crate::error::CoreError;
use crate::event::LeadKind;

const ISO_FORMAT: &str = "%Y-%m-%d";

/// A reporting window. Bounds are ISO dates or backend relative tokens
/// (`today`, `yesterday`, `NdaysAgo`) and are never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

fn is_relative_token(raw: &str) -> bool {
    if raw == "today" || raw == "yesterday" {
        return true;
    }
    raw.strip_suffix("daysAgo")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Calendar years the reporting API can address.
pub const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

fn parse_iso(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, ISO_FORMAT)
        .ok()
        .filter(|d| SUPPORTED_YEARS.contains(&d.year()))
}

impl DateRange {
    /// Validate and build a range from raw query input.
    pub fn parse(start: &str, end: &str) -> Result<Self, CoreError> {
        let start = start.trim();
        let end = end.trim();
        for raw in [start, end] {
            if parse_iso(raw).is_none() && !is_relative_token(raw) {
                return Err(CoreError::InvalidDate(raw.to_string()));
            }
        }
        if let (Some(s), Some(e)) = (parse_iso(start), parse_iso(end)) {
            if e < s {
                return Err(CoreError::InvertedRange);
            }
        }
        Ok(Self {
            start_date: start.to_string(),
            end_date: end.to_string(),
        })
    }

    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: start.format(ISO_FORMAT).to_string(),
            end_date: end.format(ISO_FORMAT).to_string(),
        }
    }

    /// `NdaysAgo` through `today`.
    pub fn last_days(days: u32) -> Self {
        Self {
            start_date: format!("{days}daysAgo"),
            end_date: "today".to_string(),
        }
    }

    /// Both bounds as calendar dates; fails for relative tokens.
    pub fn iso_bounds(&self) -> Result<(NaiveDate, NaiveDate), CoreError> {
        let start = parse_iso(&self.start_date)
            .ok_or_else(|| CoreError::RelativeDate(self.start_date.clone()))?;
        let end = parse_iso(&self.end_date)
            .ok_or_else(|| CoreError::RelativeDate(self.end_date.clone()))?;
        Ok((start, end))
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start_date, self.end_date)
    }
}

/// One day of raw counts. Rates are percentages (0–100).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub date: String,
    pub users: i64,
    pub new_users: i64,
    pub sessions: i64,
    pub pageviews: i64,
    pub bounce_rate: f64,
    pub engagement_rate: f64,
    pub conversions: i64,
    pub avg_session_duration: f64,
}

/// Sums of the daily counts and plain (unweighted) means of the daily rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricTotals {
    pub days: usize,
    pub users: i64,
    pub new_users: i64,
    pub sessions: i64,
    pub pageviews: i64,
    pub conversions: i64,
    pub bounce_rate: f64,
    pub engagement_rate: f64,
    pub avg_session_duration: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewResult {
    pub date_range: DateRange,
    pub totals: MetricTotals,
    pub daily: Vec<MetricRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceMedium {
    pub source: String,
    pub medium: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetrics {
    pub source: String,
    pub medium: String,
    pub category: Category,
    pub users: i64,
    pub sessions: i64,
    pub conversions: i64,
    pub form_submissions: i64,
    pub phone_calls: i64,
    pub click_to_lead_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetrics {
    pub channel: String,
    pub users: i64,
    pub sessions: i64,
    pub conversions: i64,
    pub form_submissions: i64,
    pub phone_calls: i64,
    pub click_to_lead_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetrics {
    pub path: String,
    pub pageviews: i64,
    pub users: i64,
    pub avg_session_duration: f64,
    pub bounce_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadEvent {
    pub event_name: String,
    pub kind: LeadKind,
    pub count: i64,
}

/// Source metrics grouped by category. Every category always has a
/// (possibly empty) sequence, sorted by sessions descending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedBreakdown {
    #[serde(rename = "organicSearch")]
    pub organic_search: Vec<SourceMetrics>,
    #[serde(rename = "paidSearch")]
    pub paid_search: Vec<SourceMetrics>,
    #[serde(rename = "llmAI")]
    pub llm_ai: Vec<SourceMetrics>,
    pub listings: Vec<SourceMetrics>,
    pub social: Vec<SourceMetrics>,
    pub referral: Vec<SourceMetrics>,
    pub direct: Vec<SourceMetrics>,
    pub other: Vec<SourceMetrics>,
}

impl DetailedBreakdown {
    pub fn get(&self, category: Category) -> &[SourceMetrics] {
        match category {
            Category::OrganicSearch => &self.organic_search,
            Category::PaidSearch => &self.paid_search,
            Category::LlmAi => &self.llm_ai,
            Category::Listings => &self.listings,
            Category::Social => &self.social,
            Category::Referral => &self.referral,
            Category::Direct => &self.direct,
            Category::Other => &self.other,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Vec<SourceMetrics> {
        match category {
            Category::OrganicSearch => &mut self.organic_search,
            Category::PaidSearch => &mut self.paid_search,
            Category::LlmAi => &mut self.llm_ai,
            Category::Listings => &mut self.listings,
            Category::Social => &mut self.social,
            Category::Referral => &mut self.referral,
            Category::Direct => &mut self.direct,
            Category::Other => &mut self.other,
        }
    }

    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub sources: usize,
    pub users: i64,
    pub sessions: i64,
    pub conversions: i64,
    pub leads: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakdownReport {
    pub date_range: DateRange,
    pub breakdown: DetailedBreakdown,
    pub summary: Vec<CategorySummary>,
}

/// Period totals used by the weekly report. `clicks` and `impressions` come
/// from the optional search-console query and stay zero when it is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTotals {
    pub users: i64,
    pub new_users: i64,
    pub sessions: i64,
    pub pageviews: i64,
    pub conversions: i64,
    pub form_submissions: i64,
    pub phone_calls: i64,
    pub bounce_rate: f64,
    pub engagement_rate: f64,
    pub avg_session_duration: f64,
    pub clicks: i64,
    pub impressions: i64,
    pub ctr: f64,
    pub click_to_lead_rate: f64,
    pub search_console_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult<T> {
    pub current: T,
    pub previous: T,
    pub changes: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodComparison {
    pub current_range: DateRange,
    pub previous_range: DateRange,
    #[serde(flatten)]
    pub result: ComparisonResult<WeeklyTotals>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyPeriod {
    pub date_range: DateRange,
    pub totals: WeeklyTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    pub current: WeeklyPeriod,
    pub previous: WeeklyPeriod,
    pub last_year: WeeklyPeriod,
    pub week_over_week: BTreeMap<String, f64>,
    pub year_over_year: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyValue {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyPoint {
    pub date: String,
    pub value: f64,
    pub deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub has_anomaly: bool,
    pub threshold: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub anomalies: Vec<AnomalyPoint>,
}

/// Read operations exposed to the HTTP routes and the assistant tools.
///
/// Breakdown-style calls take an optional range; `None` means the last
/// complete Monday–Sunday week.
#[async_trait]
pub trait AnalyticsBackend: Send + Sync + 'static {
    async fn get_overview(&self, range: &DateRange) -> anyhow::Result<OverviewResult>;

    async fn get_traffic_sources(
        &self,
        range: &DateRange,
        limit: u32,
    ) -> anyhow::Result<Vec<SourceMetrics>>;

    async fn get_top_pages(&self, range: &DateRange, limit: u32)
        -> anyhow::Result<Vec<PageMetrics>>;

    async fn get_channels(&self, range: &DateRange) -> anyhow::Result<Vec<ChannelMetrics>>;

    async fn get_breakdown(&self, range: Option<&DateRange>) -> anyhow::Result<BreakdownReport>;

    async fn get_weekly_report(&self, range: Option<&DateRange>) -> anyhow::Result<WeeklyReport>;

    async fn compare_periods(
        &self,
        current: &DateRange,
        previous: &DateRange,
    ) -> anyhow::Result<PeriodComparison>;

    async fn detect_anomalies(
        &self,
        metric: DailyMetric,
        threshold: f64,
    ) -> anyhow::Result<AnomalyResult>;

    async fn get_lead_events(&self, range: &DateRange) -> anyhow::Result<Vec<LeadEvent>>;
}
