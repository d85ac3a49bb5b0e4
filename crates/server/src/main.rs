use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod api;
mod config;
mod logging;
mod session;
mod stdio;

use config::{AppState, LogFormat, Overrides, ServerConfig, ServerFactory};
use logging::Logging;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Transport {
    /// HTTP with server-sent events
    Sse,
    /// Newline-delimited JSON on stdin/stdout
    Stdio,
}

#[derive(Parser, Debug)]
#[command(name = "baas-mcp")]
#[command(about = "MCP server for the Meeting BaaS API", long_about = None)]
struct Args {
    /// Transport to serve MCP over
    #[arg(short, long, env = "TRANSPORT", value_enum, default_value_t = Transport::Sse)]
    transport: Transport,

    /// Path to configuration file
    #[arg(short, long, default_value = "baas-mcp.toml")]
    config: PathBuf,

    /// Port to listen on (SSE only)
    #[arg(short, long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Host to bind to (SSE only)
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Meeting BaaS API key
    #[arg(long, env = "BAAS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Meeting BaaS API base URL
    #[arg(long, env = "BAAS_BASE_URL")]
    base_url: Option<String>,

    /// Log level or filter directives; RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::load(&args.config)?;
    config.apply(Overrides {
        api_key: args.api_key,
        base_url: args.base_url,
        log_level: args.log_level,
        log_format: args.log_format,
    });

    let logging = Logging::init(&config.logging)?;
    tracing::info!(
        transport = ?args.transport,
        log_format = ?logging.format(),
        base_url = %config.api.base_url,
        "Starting Meeting BaaS MCP server"
    );
    if config.api_key.is_none() {
        tracing::warn!("No API key configured; remote calls will fail unless a connection supplies one");
    }

    match args.transport {
        Transport::Stdio => {
            let factory = ServerFactory::new(&config);
            if let Err(e) = stdio::run(&factory).await {
                tracing::error!(error = %format!("{e:#}"), "Fatal stdio error");
                logging.shutdown();
                std::process::exit(1);
            }
        }
        Transport::Sse => {
            let state = AppState::new(&config)?;
            let addr = format!("{}:{}", args.host, args.port);
            api::serve(&addr, state).await?;
        }
    }

    logging.shutdown();
    Ok(())
}
