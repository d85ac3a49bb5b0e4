//! Main client for the Meeting BaaS SDK.

use crate::api::*;
use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::BaasResult;
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Main client for interacting with the Meeting BaaS API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct BaasClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl BaasClient {
    /// Create a new client builder.
    pub fn builder() -> BaasClientBuilder {
        BaasClientBuilder::new()
    }

    /// Create a client from configuration.
    fn from_config(config: ClientConfig) -> BaasResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Whether an API key was configured.
    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Get the bots API.
    pub fn bots(&self) -> BotsApi<'_> {
        BotsApi::new(self)
    }

    /// Get the calendars API.
    pub fn calendars(&self) -> CalendarsApi<'_> {
        CalendarsApi::new(self)
    }

    /// Get the calendar events API.
    pub fn events(&self) -> EventsApi<'_> {
        EventsApi::new(self)
    }
}

/// Builder for creating a BaasClient.
pub struct BaasClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl BaasClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout: None,
        }
    }

    /// Set the base URL of the API. Defaults to the production endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key. An empty key is treated as no key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.is_empty()).then_some(key);
        self
    }

    /// Set a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> BaasResult<BaasClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url)?;

        let mut config = ClientConfig::new(base_url);
        config.api_key = self.api_key;
        config.timeout = self.timeout;

        BaasClient::from_config(config)
    }
}

impl Default for BaasClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
