//! Report query model shared by the gateway and the aggregator.
//!
//! Rows are addressed positionally: `dimension_values[i]` belongs to
//! `dimensions[i]` of the request that produced it, and the same holds for
//! metrics. Readers must use the indices they requested.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::analytics::DateRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    MetricDesc(String),
    DimensionAsc(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub date_range: DateRange,
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<u32>,
}

impl ReportRequest {
    pub fn new(date_range: &DateRange, dimensions: &[&str], metrics: &[&str]) -> Self {
        Self {
            date_range: date_range.clone(),
            dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
            metrics: metrics.iter().map(|m| m.to_string()).collect(),
            order_by: None,
            limit: None,
        }
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub dimension_values: Vec<String>,
    pub metric_values: Vec<String>,
}

impl ReportRow {
    pub fn new<D, M>(dimensions: D, metrics: M) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            dimension_values: dimensions.into_iter().map(Into::into).collect(),
            metric_values: metrics.into_iter().map(Into::into).collect(),
        }
    }

    /// Dimension at `index`, or `""` when the backend omitted it.
    pub fn dimension(&self, index: usize) -> &str {
        self.dimension_values
            .get(index)
            .map(String::as_str)
            .unwrap_or("")
    }

    fn metric_raw(&self, index: usize) -> &str {
        self.metric_values
            .get(index)
            .map(String::as_str)
            .filter(|raw| !raw.trim().is_empty())
            .unwrap_or("0")
    }

    /// Integer metric at `index`. Missing or malformed values read as 0.
    pub fn metric_i64(&self, index: usize) -> i64 {
        let raw = self.metric_raw(index).trim();
        raw.parse::<i64>()
            .ok()
            .or_else(|| raw.parse::<f64>().ok().map(|v| v as i64))
            .unwrap_or(0)
    }

    /// Float metric at `index`. Missing or malformed values read as 0.0.
    pub fn metric_f64(&self, index: usize) -> f64 {
        self.metric_raw(index)
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    /// Ratio metric (0–1) at `index`, scaled to a percentage.
    pub fn metric_pct(&self, index: usize) -> f64 {
        self.metric_f64(index) * 100.0
    }
}

/// Turn a `YYYYMMDD` date dimension into `YYYY-MM-DD`; anything else is
/// returned unchanged.
pub fn normalize_date(raw: &str) -> String {
    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &raw[0..4], &raw[4..6], &raw[6..8])
    } else {
        raw.to_string()
    }
}

/// Source of raw report rows (the analytics backend).
#[async_trait]
pub trait ReportGateway: Send + Sync + 'static {
    async fn run_report(&self, request: &ReportRequest) -> anyhow::Result<Vec<ReportRow>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_compact_dates() {
        assert_eq!(normalize_date("20240115"), "2024-01-15");
        assert_eq!(normalize_date("2024-01-15"), "2024-01-15");
        assert_eq!(normalize_date("2024011"), "2024011");
        assert_eq!(normalize_date(""), "");
    }

    #[test]
    fn missing_values_default_to_zero() {
        let row = ReportRow::new(["google"], ["12", "", "abc"]);
        assert_eq!(row.dimension(0), "google");
        assert_eq!(row.dimension(3), "");
        assert_eq!(row.metric_i64(0), 12);
        assert_eq!(row.metric_i64(1), 0);
        assert_eq!(row.metric_i64(2), 0);
        assert_eq!(row.metric_i64(9), 0);
        assert_eq!(row.metric_f64(9), 0.0);
    }

    #[test]
    fn ratio_metrics_scale_to_percent() {
        let row = ReportRow::new(Vec::<String>::new(), ["0.425", "37.5"]);
        assert!((row.metric_pct(0) - 42.5).abs() < 1e-9);
        assert_eq!(row.metric_i64(1), 37);
    }
}
