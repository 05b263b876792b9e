use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use channelscope_core::config::Config;
use channelscope_core::report::ReportGateway;

use crate::client::Ga4Client;

/// Analytics backend over a report gateway.
///
/// Holds the gateway behind an `Arc` so the struct can be shared across Axum
/// handlers. Production wires in a [`Ga4Client`]; tests pass a fake gateway
/// returning canned rows.
#[derive(Clone)]
pub struct Ga4Analytics {
    pub(crate) gateway: Arc<dyn ReportGateway>,
}

impl Ga4Analytics {
    pub fn new(gateway: Arc<dyn ReportGateway>) -> Self {
        Self { gateway }
    }

    /// Build the GA4 HTTP client from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Ga4Client::from_config(config)?;
        info!(
            property_id = %config.ga4_property_id,
            endpoint = %client.endpoint(),
            "GA4 backend configured"
        );
        Ok(Self::new(Arc::new(client)))
    }

    pub fn gateway(&self) -> &dyn ReportGateway {
        self.gateway.as_ref()
    }
}
