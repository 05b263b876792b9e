//! Z-score anomaly detection over a daily metric series.

use serde::{Deserialize, Serialize};

use crate::analytics::{AnomalyPoint, AnomalyResult, DailyValue, MetricRow};
use crate::error::CoreError;

/// Days of history the anomaly check looks at.
pub const LOOKBACK_DAYS: u32 = 30;

pub const DEFAULT_THRESHOLD: f64 = 2.0;

/// A per-day metric the detector can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyMetric {
    Users,
    NewUsers,
    Sessions,
    Pageviews,
    Conversions,
    BounceRate,
    EngagementRate,
    AvgSessionDuration,
}

impl DailyMetric {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim() {
            "users" | "activeUsers" => Ok(Self::Users),
            "new_users" | "newUsers" => Ok(Self::NewUsers),
            "sessions" => Ok(Self::Sessions),
            "pageviews" | "screenPageViews" => Ok(Self::Pageviews),
            "conversions" => Ok(Self::Conversions),
            "bounce_rate" | "bounceRate" => Ok(Self::BounceRate),
            "engagement_rate" | "engagementRate" => Ok(Self::EngagementRate),
            "avg_session_duration" | "averageSessionDuration" => Ok(Self::AvgSessionDuration),
            other => Err(CoreError::UnknownMetric(other.to_string())),
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::NewUsers => "new_users",
            Self::Sessions => "sessions",
            Self::Pageviews => "pageviews",
            Self::Conversions => "conversions",
            Self::BounceRate => "bounce_rate",
            Self::EngagementRate => "engagement_rate",
            Self::AvgSessionDuration => "avg_session_duration",
        }
    }

    pub fn value(self, row: &MetricRow) -> f64 {
        match self {
            Self::Users => row.users as f64,
            Self::NewUsers => row.new_users as f64,
            Self::Sessions => row.sessions as f64,
            Self::Pageviews => row.pageviews as f64,
            Self::Conversions => row.conversions as f64,
            Self::BounceRate => row.bounce_rate,
            Self::EngagementRate => row.engagement_rate,
            Self::AvgSessionDuration => row.avg_session_duration,
        }
    }

    pub fn series(self, daily: &[MetricRow]) -> Vec<DailyValue> {
        daily
            .iter()
            .map(|row| DailyValue {
                date: row.date.clone(),
                value: self.value(row),
            })
            .collect()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N).
fn population_stddev(values: &[f64], mean_value: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|v| {
            let diff = *v - mean_value;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Flag every point whose z-score magnitude is strictly above `threshold`.
///
/// A constant series has σ = 0, every deviation is 0 and nothing is flagged.
pub fn detect_anomalies(series: &[DailyValue], threshold: f64) -> AnomalyResult {
    let values: Vec<f64> = series.iter().map(|point| point.value).collect();
    let mean_value = mean(&values);
    let std_dev = population_stddev(&values, mean_value);

    let anomalies: Vec<AnomalyPoint> = series
        .iter()
        .filter_map(|point| {
            let deviation = if std_dev > 0.0 {
                (point.value - mean_value) / std_dev
            } else {
                0.0
            };
            (deviation.abs() > threshold).then(|| AnomalyPoint {
                date: point.date.clone(),
                value: point.value,
                deviation,
            })
        })
        .collect();

    AnomalyResult {
        has_anomaly: !anomalies.is_empty(),
        threshold,
        mean: mean_value,
        std_dev,
        anomalies,
    }
}
