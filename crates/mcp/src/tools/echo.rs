// Connectivity check tool

use crate::error::ToolError;
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_object, json_schema_string, parse_arguments, Tool, ToolArguments};
use serde::Deserialize;

/// Tool that answers with its input; makes no remote call.
pub struct EchoTool;

#[derive(Debug, Deserialize)]
struct EchoArgs {
    message: String,
}

impl ToolArguments for EchoArgs {}

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "echo".to_string(),
            description: "Echo a message back to check the server is reachable".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "message": json_schema_string("Message to echo")
                }),
                vec!["message"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult, ToolError> {
        let args: EchoArgs = parse_arguments("echo", arguments)?;
        Ok(CallToolResult::text(format!("Tool echo: {}", args.message)))
    }
}
