use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use channelscope_core::config::Config;
use channelscope_core::report::{OrderBy, ReportGateway, ReportRequest, ReportRow};

/// HTTP client for the GA4 Data API.
///
/// Every report is a `POST {api_base}/properties/{property_id}:runReport`
/// authenticated with a bearer token. Built once at startup and shared by
/// handle; it holds no per-request state.
#[derive(Clone)]
pub struct Ga4Client {
    client: Client,
    endpoint: Url,
    access_token: String,
}

impl Ga4Client {
    pub fn new(api_base: &str, property_id: &str, access_token: &str) -> Result<Self> {
        let endpoint = Url::parse(&format!(
            "{}/properties/{}:runReport",
            api_base.trim_end_matches('/'),
            property_id.trim()
        ))
        .context("Invalid GA4 API base URL")?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            access_token: access_token.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.ga4_api_base,
            &config.ga4_property_id,
            &config.ga4_access_token,
        )
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

/// JSON body for a `runReport` call.
pub fn request_body(request: &ReportRequest) -> Value {
    let mut body = json!({
        "dateRanges": [{
            "startDate": request.date_range.start_date,
            "endDate": request.date_range.end_date,
        }],
        "dimensions": request
            .dimensions
            .iter()
            .map(|name| json!({ "name": name }))
            .collect::<Vec<_>>(),
        "metrics": request
            .metrics
            .iter()
            .map(|name| json!({ "name": name }))
            .collect::<Vec<_>>(),
    });

    if let Some(order_by) = &request.order_by {
        body["orderBys"] = match order_by {
            OrderBy::MetricDesc(metric) => json!([{
                "metric": { "metricName": metric },
                "desc": true,
            }]),
            OrderBy::DimensionAsc(dimension) => json!([{
                "dimension": { "dimensionName": dimension },
                "desc": false,
            }]),
        };
    }
    if let Some(limit) = request.limit {
        body["limit"] = json!(limit.to_string());
    }
    body
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportResponse {
    #[serde(default)]
    pub rows: Vec<ResponseRow>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRow {
    #[serde(default)]
    pub dimension_values: Vec<ResponseValue>,
    #[serde(default)]
    pub metric_values: Vec<ResponseValue>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ResponseValue {
    #[serde(default)]
    pub value: Option<String>,
}

impl From<ResponseRow> for ReportRow {
    fn from(row: ResponseRow) -> Self {
        ReportRow::new(
            row.dimension_values
                .into_iter()
                .map(|v| v.value.unwrap_or_default()),
            row.metric_values
                .into_iter()
                .map(|v| v.value.unwrap_or_else(|| "0".to_string())),
        )
    }
}

#[async_trait]
impl ReportGateway for Ga4Client {
    async fn run_report(&self, request: &ReportRequest) -> Result<Vec<ReportRow>> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.access_token)
            .json(&request_body(request))
            .send()
            .await
            .context("GA4 runReport request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GA4 runReport error {status}: {body}");
        }

        let report: RunReportResponse = resp
            .json()
            .await
            .context("GA4 runReport response parse failed")?;
        debug!(
            rows = report.rows.len(),
            dimensions = ?request.dimensions,
            "GA4 report fetched"
        );
        Ok(report.rows.into_iter().map(ReportRow::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use channelscope_core::analytics::DateRange;

    use super::*;

    #[test]
    fn endpoint_includes_property() {
        let client = Ga4Client::new("https://example.test/v1beta/", "42", "t").expect("client");
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/properties/42:runReport"
        );
    }

    #[test]
    fn body_preserves_requested_order() {
        let request = ReportRequest::new(
            &DateRange::last_days(7),
            &["sessionSource", "sessionMedium"],
            &["activeUsers", "sessions"],
        )
        .order_by(OrderBy::MetricDesc("sessions".to_string()))
        .limit(25);
        let body = request_body(&request);
        assert_eq!(body["dateRanges"][0]["startDate"], "7daysAgo");
        assert_eq!(body["dimensions"][1]["name"], "sessionMedium");
        assert_eq!(body["metrics"][0]["name"], "activeUsers");
        assert_eq!(body["orderBys"][0]["metric"]["metricName"], "sessions");
        assert_eq!(body["orderBys"][0]["desc"], true);
        assert_eq!(body["limit"], "25");
    }

    #[test]
    fn body_omits_optional_fields() {
        let request = ReportRequest::new(&DateRange::last_days(1), &["date"], &["sessions"]);
        let body = request_body(&request);
        assert!(body.get("orderBys").is_none());
        assert!(body.get("limit").is_none());
    }

    #[test]
    fn response_rows_keep_positions_and_default_missing_values() {
        let raw = r#"{
            "rows": [
                {"dimensionValues": [{"value": "20260210"}], "metricValues": [{"value": "12"}, {}]}
            ],
            "rowCount": 1
        }"#;
        let report: RunReportResponse = serde_json::from_str(raw).expect("parse");
        let rows: Vec<ReportRow> = report.rows.into_iter().map(ReportRow::from).collect();
        assert_eq!(rows[0].dimension(0), "20260210");
        assert_eq!(rows[0].metric_i64(0), 12);
        assert_eq!(rows[0].metric_i64(1), 0);
    }

    #[test]
    fn empty_report_has_no_rows() {
        let report: RunReportResponse = serde_json::from_str("{}").expect("parse");
        assert!(report.rows.is_empty());
    }
}
