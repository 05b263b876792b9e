pub const DEFAULT_GA4_API_BASE: &str = "https://analyticsdata.googleapis.com/v1beta";

pub const DEFAULT_SOURCE_LIMIT: u32 = 50;

/// Largest row limit a single report may request.
pub const MAX_REPORT_LIMIT: u32 = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub ga4_property_id: String,
    /// OAuth bearer token sent with every `runReport` call.
    pub ga4_access_token: String,
    pub ga4_api_base: String,
    pub cors_origins: Vec<String>,
    pub anomaly_threshold: f64,
    pub source_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("CHANNELSCOPE_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            ga4_property_id: std::env::var("CHANNELSCOPE_GA4_PROPERTY_ID")
                .map_err(|_| "CHANNELSCOPE_GA4_PROPERTY_ID is required".to_string())?,
            ga4_access_token: std::env::var("CHANNELSCOPE_GA4_ACCESS_TOKEN")
                .map_err(|_| "CHANNELSCOPE_GA4_ACCESS_TOKEN is required".to_string())?,
            ga4_api_base: std::env::var("CHANNELSCOPE_GA4_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_GA4_API_BASE.to_string()),
            cors_origins: std::env::var("CHANNELSCOPE_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            anomaly_threshold: std::env::var("CHANNELSCOPE_ANOMALY_THRESHOLD")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| *v > 0.0)
                .unwrap_or(crate::anomaly::DEFAULT_THRESHOLD),
            source_limit: std::env::var("CHANNELSCOPE_SOURCE_LIMIT")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|v| (1..=MAX_REPORT_LIMIT).contains(v))
                .unwrap_or(DEFAULT_SOURCE_LIMIT),
        })
    }
}
