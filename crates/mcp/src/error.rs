//! Error types for the MCP crate.

use crate::protocol::{error_codes, JsonRpcError};
use baas_sdk::BaasError;

/// Errors raised by the protocol layer and the tool registry.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Failed to parse JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Transport I/O error.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// One inbound message could not be read as a line of text.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// The requested method is not supported.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Invalid parameters for a method.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// The requested tool was not found in the registry.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A tool with this name is already registered.
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// Tool name or description rejected at registration.
    #[error("Invalid tool definition '{name}': {reason}")]
    InvalidTool { name: String, reason: String },

    /// Remote client could not be built.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl McpError {
    /// Convert to a JSON-RPC error object.
    pub fn to_rpc_error(&self) -> JsonRpcError {
        let code = match self {
            McpError::JsonParse(_) | McpError::MalformedMessage(_) => error_codes::PARSE_ERROR,
            McpError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            McpError::InvalidParams(_) | McpError::ToolNotFound(_) => error_codes::INVALID_PARAMS,
            _ => error_codes::INTERNAL_ERROR,
        };
        JsonRpcError::new(code, self.to_string())
    }
}

impl From<BaasError> for McpError {
    fn from(err: BaasError) -> Self {
        McpError::Config(err.to_string())
    }
}

/// Failure of a single tool invocation.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Arguments did not match the tool's schema.
    #[error("Invalid arguments for {tool}: {message}")]
    Validation { tool: String, message: String },

    /// The remote API call failed.
    #[error("Failed to {operation}{}: {source}", fmt_target(.target))]
    RemoteCall {
        operation: &'static str,
        target: Option<String>,
        #[source]
        source: BaasError,
    },
}

impl ToolError {
    pub fn validation(tool: &str, message: impl Into<String>) -> Self {
        ToolError::Validation {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    pub fn remote(operation: &'static str, target: impl ToString, source: BaasError) -> Self {
        ToolError::RemoteCall {
            operation,
            target: Some(target.to_string()),
            source,
        }
    }

    /// Remote failure of an operation that is not about a single resource.
    pub fn remote_untargeted(operation: &'static str, source: BaasError) -> Self {
        ToolError::RemoteCall {
            operation,
            target: None,
            source,
        }
    }
}

fn fmt_target(target: &Option<String>) -> String {
    match target {
        Some(target) => format!(" {target}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_codes() {
        assert_eq!(
            McpError::MethodNotFound("x".into()).to_rpc_error().code,
            error_codes::METHOD_NOT_FOUND
        );
        assert_eq!(
            McpError::ToolNotFound("x".into()).to_rpc_error().code,
            error_codes::INVALID_PARAMS
        );
        assert_eq!(
            McpError::DuplicateTool("echo".into()).to_rpc_error().code,
            error_codes::INTERNAL_ERROR
        );
        assert_eq!(
            McpError::MalformedMessage("bad utf-8".into()).to_rpc_error().code,
            error_codes::PARSE_ERROR
        );
    }

    #[test]
    fn test_remote_call_message_names_operation_and_target() {
        let err = ToolError::remote(
            "leave meeting",
            "bot-1",
            BaasError::NotFound("no such bot".into()),
        );
        assert_eq!(
            err.to_string(),
            "Failed to leave meeting bot-1: Resource not found: no such bot"
        );

        let err = ToolError::remote_untargeted(
            "list calendars",
            BaasError::Api {
                status: 500,
                message: "boom".into(),
            },
        );
        assert_eq!(
            err.to_string(),
            "Failed to list calendars: API error (status 500): boom"
        );
    }
}
