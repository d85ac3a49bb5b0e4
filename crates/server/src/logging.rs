//! Process logging.
//!
//! Everything goes to stderr so stdout stays free for the stdio transport.
//! `RUST_LOG` takes precedence over the configured level.

use anyhow::{anyhow, Context, Result};
use std::io::Write;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Handle to the installed subscriber.
#[derive(Debug)]
pub struct Logging {
    format: LogFormat,
}

impl Logging {
    /// Install the global subscriber. Fails if one is already installed.
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let filter = env_filter(config)?;
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false);

        match config.format {
            LogFormat::Pretty => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
        }
        .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))?;

        Ok(Self {
            format: config.format,
        })
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Flush buffered output before the process exits.
    pub fn shutdown(self) {
        tracing::debug!("Logging shut down");
        let _ = std::io::stderr().flush();
    }
}

fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level '{}'", config.level)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "baas_mcp=loud".to_string(),
            format: LogFormat::Pretty,
        };
        assert!(env_filter(&config).is_err());
    }

    #[test]
    fn test_directive_level_accepted() {
        let config = LoggingConfig {
            level: "baas_mcp=debug,tower_http=info".to_string(),
            format: LogFormat::Json,
        };
        assert!(env_filter(&config).is_ok());
    }
}
