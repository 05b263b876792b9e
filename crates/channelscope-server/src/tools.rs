//! Assistant tool registry.
//!
//! Each tool is one read on [`AnalyticsBackend`]; the chat loop that picks
//! tools lives outside this server and only sees the definitions and the
//! JSON results.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use channelscope_core::analytics::AnalyticsBackend;
use channelscope_core::compare::{previous_period, same_range_last_year};
use channelscope_ga4::queries::pages::DEFAULT_PAGE_LIMIT;

use crate::config::Config;
use crate::error::AppError;
use crate::routes::analytics::resolve_anomaly_query;
use crate::routes::compare::{resolve_compare_ranges, CompareQuery};
use crate::routes::{optional_range, range_or_default, validate_limit};

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema of the `arguments` object.
    pub parameters: Value,
}

pub const TOOL_NAMES: [&str; 9] = [
    "get_overview",
    "get_traffic_sources",
    "get_top_pages",
    "get_channels",
    "get_source_breakdown",
    "get_weekly_report",
    "compare_periods",
    "detect_anomalies",
    "get_lead_events",
];

fn date_properties() -> serde_json::Map<String, Value> {
    let mut props = serde_json::Map::new();
    props.insert(
        "start_date".to_string(),
        json!({
            "type": "string",
            "description": "YYYY-MM-DD, today, yesterday or NdaysAgo"
        }),
    );
    props.insert(
        "end_date".to_string(),
        json!({
            "type": "string",
            "description": "YYYY-MM-DD, today, yesterday or NdaysAgo"
        }),
    );
    props
}

fn object_schema(extra: &[(&str, Value)], with_dates: bool) -> Value {
    let mut props = if with_dates {
        date_properties()
    } else {
        serde_json::Map::new()
    };
    for (name, schema) in extra {
        props.insert((*name).to_string(), schema.clone());
    }
    json!({ "type": "object", "properties": props })
}

pub fn definitions() -> Vec<ToolDefinition> {
    let limit = json!({ "type": "integer", "minimum": 1 });
    vec![
        ToolDefinition {
            name: "get_overview",
            description: "Daily users, sessions, pageviews, conversions and engagement with period totals.",
            parameters: object_schema(&[], true),
        },
        ToolDefinition {
            name: "get_traffic_sources",
            description: "Traffic by session source and medium, each tagged with its marketing category and lead counts.",
            parameters: object_schema(&[("limit", limit.clone())], true),
        },
        ToolDefinition {
            name: "get_top_pages",
            description: "Most viewed pages with users, average session duration and bounce rate.",
            parameters: object_schema(&[("limit", limit)], true),
        },
        ToolDefinition {
            name: "get_channels",
            description: "Metrics per default channel group.",
            parameters: object_schema(&[], true),
        },
        ToolDefinition {
            name: "get_source_breakdown",
            description: "Every traffic source grouped into organic search, paid search, AI assistants, listings, social, referral, direct and other. Defaults to the last complete Monday to Sunday week.",
            parameters: object_schema(&[], true),
        },
        ToolDefinition {
            name: "get_weekly_report",
            description: "Weekly totals with week-over-week and year-over-year changes, including leads and search console clicks. Defaults to the last complete week.",
            parameters: object_schema(&[], true),
        },
        ToolDefinition {
            name: "compare_periods",
            description: "Compare totals of two date ranges. The comparison range defaults to the period right before the current one.",
            parameters: object_schema(
                &[
                    ("compare_start_date", json!({ "type": "string" })),
                    ("compare_end_date", json!({ "type": "string" })),
                ],
                true,
            ),
        },
        ToolDefinition {
            name: "detect_anomalies",
            description: "Find days in the last 30 whose value deviates from the mean by more than the threshold in standard deviations.",
            parameters: object_schema(
                &[
                    (
                        "metric",
                        json!({
                            "type": "string",
                            "enum": [
                                "users", "new_users", "sessions", "pageviews", "conversions",
                                "bounce_rate", "engagement_rate", "avg_session_duration"
                            ]
                        }),
                    ),
                    ("threshold", json!({ "type": "number", "exclusiveMinimum": 0 })),
                ],
                false,
            ),
        },
        ToolDefinition {
            name: "get_lead_events",
            description: "Form submission and phone call events with their counts.",
            parameters: object_schema(&[], true),
        },
    ]
}

/// Union of every tool's arguments; each tool reads the fields it needs.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ToolArguments {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub compare_start_date: Option<String>,
    pub compare_end_date: Option<String>,
    pub limit: Option<u32>,
    pub metric: Option<String>,
    pub threshold: Option<f64>,
}

fn parse_arguments(arguments: Value) -> Result<ToolArguments, AppError> {
    if arguments.is_null() {
        return Ok(ToolArguments::default());
    }
    serde_json::from_value(arguments)
        .map_err(|e| AppError::BadRequest(format!("invalid tool arguments: {e}")))
}

fn to_value<T: Serialize>(result: T) -> Result<Value, AppError> {
    serde_json::to_value(result).map_err(|e| AppError::Internal(e.to_string()))
}

/// Run the tool called `name` and return its result as JSON.
pub async fn dispatch(
    analytics: &dyn AnalyticsBackend,
    config: &Config,
    name: &str,
    arguments: Value,
) -> Result<Value, AppError> {
    if !TOOL_NAMES.contains(&name) {
        return Err(AppError::NotFound(format!("unknown tool: {name}")));
    }
    let args = parse_arguments(arguments)?;
    info!(tool = name, "Dispatching tool call");

    let start = args.start_date.as_deref();
    let end = args.end_date.as_deref();
    match name {
        "get_overview" => {
            let range = range_or_default(start, end)?;
            to_value(analytics.get_overview(&range).await?)
        }
        "get_traffic_sources" => {
            let range = range_or_default(start, end)?;
            let limit = validate_limit(args.limit, config.source_limit)?;
            to_value(analytics.get_traffic_sources(&range, limit).await?)
        }
        "get_top_pages" => {
            let range = range_or_default(start, end)?;
            let limit = validate_limit(args.limit, DEFAULT_PAGE_LIMIT)?;
            to_value(analytics.get_top_pages(&range, limit).await?)
        }
        "get_channels" => {
            let range = range_or_default(start, end)?;
            to_value(analytics.get_channels(&range).await?)
        }
        "get_source_breakdown" => {
            let range = optional_range(start, end)?;
            to_value(analytics.get_breakdown(range.as_ref()).await?)
        }
        "get_weekly_report" => {
            let range = optional_range(start, end)?;
            if let Some(range) = &range {
                previous_period(range)?;
                same_range_last_year(range)?;
            }
            to_value(analytics.get_weekly_report(range.as_ref()).await?)
        }
        "compare_periods" => {
            let query = CompareQuery {
                start_date: args.start_date.clone(),
                end_date: args.end_date.clone(),
                compare_start_date: args.compare_start_date.clone(),
                compare_end_date: args.compare_end_date.clone(),
            };
            let today = chrono::Utc::now().date_naive();
            let (current, previous) = resolve_compare_ranges(&query, today)?;
            to_value(analytics.compare_periods(&current, &previous).await?)
        }
        "detect_anomalies" => {
            let (metric, threshold) = resolve_anomaly_query(
                args.metric.as_deref(),
                args.threshold,
                config.anomaly_threshold,
            )?;
            let result = analytics.detect_anomalies(metric, threshold).await?;
            Ok(json!({ "metric": metric, "result": to_value(result)? }))
        }
        "get_lead_events" => {
            let range = range_or_default(start, end)?;
            to_value(analytics.get_lead_events(&range).await?)
        }
        other => Err(AppError::NotFound(format!("unknown tool: {other}"))),
    }
}
