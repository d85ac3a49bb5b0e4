use anyhow::{Context, Result};
use baas_mcp::{register_tools_with_client, McpServer};
use baas_sdk::{BaasClient, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::session::SessionRegistry;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Only ever set from the command line or environment.
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout against the remote API. Unset means no timeout.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .context("Failed to read configuration file")?;
            toml::from_str(&content).context("Failed to parse configuration file")
        } else {
            Ok(Self::default())
        }
    }

    /// Command line and environment win over the file.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(key) = overrides.api_key.filter(|key| !key.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(base_url) = overrides.base_url {
            self.api.base_url = base_url;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
    }
}

/// Builds a fully registered MCP server per connection (SSE) or per
/// process (stdio).
#[derive(Debug, Clone)]
pub struct ServerFactory {
    base_url: String,
    timeout: Option<Duration>,
    api_key: Option<String>,
}

impl ServerFactory {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            base_url: config.api.base_url.clone(),
            timeout: config.api.request_timeout_secs.map(Duration::from_secs),
            api_key: config.api_key.clone(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Remote client using `api_key`, or the configured key when absent.
    pub fn client(&self, api_key: Option<&str>) -> Result<BaasClient> {
        let mut builder = BaasClient::builder().base_url(&self.base_url);
        if let Some(key) = api_key.or(self.api_key.as_deref()) {
            builder = builder.api_key(key);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().context("Failed to build Meeting BaaS client")
    }

    pub fn build(&self, api_key: Option<&str>) -> Result<McpServer> {
        let client = self.client(api_key.filter(|key| !key.is_empty()))?;
        let mut server = McpServer::default();
        register_tools_with_client(&mut server, &client).context("Failed to register tools")?;
        Ok(server)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub factory: ServerFactory,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let factory = ServerFactory::new(config);
        // Fail at startup on a bad base URL rather than on the first connection
        factory.client(None)?;

        Ok(Self {
            factory,
            sessions: SessionRegistry::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.request_timeout_secs, None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_load_file_and_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://staging.example.com"
request_timeout_secs = 20

[logging]
format = "json"
"#
        )
        .unwrap();

        let mut config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://staging.example.com");
        assert_eq!(config.api.request_timeout_secs, Some(20));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");

        config.apply(Overrides {
            api_key: Some("sk-live".to_string()),
            log_level: Some("debug".to_string()),
            ..Default::default()
        });
        assert_eq!(config.api_key.as_deref(), Some("sk-live"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.api.base_url, "https://staging.example.com");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = 1").unwrap();
        assert!(ServerConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_empty_api_key_ignored() {
        let mut config = ServerConfig::default();
        config.apply(Overrides {
            api_key: Some(String::new()),
            ..Default::default()
        });
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_factory_builds_full_catalog() {
        let factory = ServerFactory::new(&ServerConfig::default());
        assert!(!factory.has_api_key());

        let server = factory.build(Some("per-connection-key")).unwrap();
        assert_eq!(server.registry().len(), 19);
        assert!(server.registry().contains("joinMeeting"));
    }

    #[test]
    fn test_bad_base_url_rejected_at_startup() {
        let mut config = ServerConfig::default();
        config.api.base_url = "not a url".to_string();
        assert!(AppState::new(&config).is_err());
    }
}
