use std::sync::Arc;

use channelscope_core::analytics::AnalyticsBackend;

use crate::config::Config;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// Read-only after startup; every request fans out its own reports.
pub struct AppState {
    /// Analytics reads. The GA4 backend in production, a fake gateway in tests.
    pub analytics: Arc<dyn AnalyticsBackend>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(analytics: Arc<dyn AnalyticsBackend>, config: Config) -> Self {
        Self {
            analytics,
            config: Arc::new(config),
        }
    }
}
