//! Configuration types for the Meeting BaaS SDK.

use std::time::Duration;
use url::Url;

/// Production endpoint of the Meeting BaaS API.
pub const DEFAULT_BASE_URL: &str = "https://api.meetingbaas.com";

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-meeting-baas-api-key";

/// Configuration for the Meeting BaaS client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API.
    pub base_url: Url,
    /// API key for authentication.
    pub api_key: Option<String>,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL. A path prefix
    /// such as `/v1` is kept for every request path.
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            api_key: None,
            timeout: None,
        }
    }
}
