use anyhow::{Context, Result};
use baas_mcp::StdioTransport;
use std::sync::Arc;

use crate::config::ServerFactory;

/// Serve one MCP server over stdin/stdout until stdin closes.
pub async fn run(factory: &ServerFactory) -> Result<()> {
    let server = Arc::new(factory.build(None)?);
    let mut transport = StdioTransport::stdio();

    tracing::info!(
        authenticated = factory.has_api_key(),
        "Serving MCP over stdio"
    );
    server
        .run(&mut transport)
        .await
        .context("stdio transport failed")
}
