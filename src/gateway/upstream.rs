//! Upstream origin and the client used to reach it.

use std::time::Duration;

use crate::config::GatewayConfig;

/// Snapshot of everything needed to reach the backend.
///
/// Swapped as a whole on config reload; a request keeps the snapshot it
/// started with.
#[derive(Debug, Clone)]
pub struct Upstream {
    base_url: String,
    client: reqwest::Client,
}

impl Upstream {
    /// Build the upstream client from configuration.
    ///
    /// No timeout is applied unless one is configured. System proxy variables
    /// are ignored; the backend is addressed directly.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().no_proxy();

        if let Some(secs) = config.timeouts.connect_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            base_url: config.upstream.base().to_string(),
            client: builder.build()?,
        })
    }

    /// Backend base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}
