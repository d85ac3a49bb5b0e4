// MCP tool trait, registry and schema helpers

use crate::error::{McpError, ToolError};
use crate::protocol::{CallToolResult, ToolSchema};
use futures::FutureExt;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError>;
}

/// Tool registry for managing available tools.
///
/// Tools are listed in registration order.
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), McpError> {
        self.register_all(vec![tool])
    }

    /// Register a batch of tools. Nothing is added unless every tool is valid
    /// and no name collides with a registered tool or another in the batch.
    pub fn register_all(&mut self, tools: Vec<Arc<dyn Tool>>) -> Result<(), McpError> {
        let mut batch = IndexMap::with_capacity(tools.len());
        for tool in tools {
            let schema = tool.schema();
            check_definition(&schema)?;
            if self.tools.contains_key(&schema.name) || batch.contains_key(&schema.name) {
                return Err(McpError::DuplicateTool(schema.name));
            }
            batch.insert(schema.name, tool);
        }
        self.tools.extend(batch);
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all tool schemas
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool and turn its outcome into a content envelope.
    ///
    /// Remote failures and panics become `isError` envelopes. Argument
    /// validation failures surface as `McpError::InvalidParams`.
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<CallToolResult, McpError> {
        let tool = self
            .get(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;

        let outcome = AssertUnwindSafe(tool.execute(arguments))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => match &err {
                ToolError::Validation { .. } => {
                    tracing::debug!(tool = %name, error = %err, "Rejected tool arguments");
                    Err(McpError::InvalidParams(err.to_string()))
                }
                ToolError::RemoteCall {
                    operation,
                    target,
                    source,
                } => {
                    tracing::error!(
                        tool = %name,
                        operation = %operation,
                        target = target.as_deref().unwrap_or("-"),
                        error = %source,
                        "Remote call failed"
                    );
                    Ok(CallToolResult::error(err.to_string()))
                }
            },
            Err(_) => {
                tracing::error!(tool = %name, "Tool handler panicked");
                Ok(CallToolResult::error(format!("Tool {name} failed unexpectedly")))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn check_definition(schema: &ToolSchema) -> Result<(), McpError> {
    let invalid = |reason: &str| McpError::InvalidTool {
        name: schema.name.clone(),
        reason: reason.to_string(),
    };

    if !is_valid_tool_name(&schema.name) {
        return Err(invalid("name must match ^[A-Za-z][A-Za-z0-9_]*$"));
    }
    if schema.description.trim().is_empty() {
        return Err(invalid("description is empty"));
    }
    if schema.input_schema.get("type") != Some(&json!("object")) {
        return Err(invalid("input schema must be an object schema"));
    }
    Ok(())
}

fn is_valid_tool_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Typed tool arguments with checks serde cannot express.
pub trait ToolArguments: DeserializeOwned {
    /// Range, format and cross-field checks, run after deserialization.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Deserialize and validate the arguments of `tool`.
///
/// Absent or `null` arguments are read as an empty object. Unknown fields are
/// ignored.
pub fn parse_arguments<T: ToolArguments>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        Value::Object(map) => Value::Object(map),
        other => {
            return Err(ToolError::validation(
                tool,
                format!("arguments must be an object, got {other}"),
            ))
        }
    };

    let args: T =
        serde_json::from_value(arguments).map_err(|e| ToolError::validation(tool, e.to_string()))?;
    args.validate()
        .map_err(|message| ToolError::validation(tool, message))?;
    Ok(args)
}

/// Reject values that are not absolute URLs.
pub fn check_uri(field: &str, value: &str) -> Result<(), String> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| format!("{field} must be a valid URL: {e}"))
}

pub fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), String> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} must be between {min} and {max}, got {value}"))
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: Value, required: Vec<&str>) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_integer(description: &str, minimum: Option<u32>, maximum: Option<u32>) -> Value {
    let mut schema = json!({
        "type": "integer",
        "description": description
    });
    if let Some(minimum) = minimum {
        schema["minimum"] = json!(minimum);
    }
    if let Some(maximum) = maximum {
        schema["maximum"] = json!(maximum);
    }
    schema
}

pub fn json_schema_boolean(description: &str) -> Value {
    json!({
        "type": "boolean",
        "description": description
    })
}

pub fn json_schema_uuid(description: &str) -> Value {
    json!({
        "type": "string",
        "format": "uuid",
        "description": description
    })
}

pub fn json_schema_uri(description: &str) -> Value {
    json!({
        "type": "string",
        "format": "uri",
        "description": description
    })
}

pub fn json_schema_enum(description: &str, values: &[&str]) -> Value {
    json!({
        "type": "string",
        "enum": values,
        "description": description
    })
}

/// Object with arbitrary keys.
pub fn json_schema_free_object(description: &str) -> Value {
    json!({
        "type": "object",
        "additionalProperties": true,
        "description": description
    })
}

/// Allow an explicit `null` in addition to the wrapped schema.
pub fn nullable(mut schema: Value) -> Value {
    if let Some(kind) = schema.get("type").and_then(Value::as_str) {
        let kinds = json!([kind, "null"]);
        schema["type"] = kinds;
    }
    if let Some(values) = schema.get_mut("enum").and_then(Value::as_array_mut) {
        values.push(Value::Null);
    }
    schema
}

pub fn with_default(mut schema: Value, default: Value) -> Value {
    schema["default"] = default;
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    struct FixedTool {
        name: &'static str,
        description: &'static str,
    }

    #[async_trait::async_trait]
    impl Tool for FixedTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.name.to_string(),
                description: self.description.to_string(),
                input_schema: json_schema_object(json!({}), vec![]),
            }
        }

        async fn execute(&self, _arguments: Value) -> Result<CallToolResult, ToolError> {
            Ok(CallToolResult::text(self.name))
        }
    }

    struct PanickingTool;

    #[async_trait::async_trait]
    impl Tool for PanickingTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "explode".to_string(),
                description: "Always panics".to_string(),
                input_schema: json_schema_object(json!({}), vec![]),
            }
        }

        async fn execute(&self, _arguments: Value) -> Result<CallToolResult, ToolError> {
            panic!("handler bug")
        }
    }

    fn tool(name: &'static str) -> Arc<dyn Tool> {
        Arc::new(FixedTool {
            name,
            description: "test tool",
        })
    }

    #[test]
    fn test_register_preserves_order() {
        let mut registry = ToolRegistry::new();
        registry
            .register_all(vec![tool("zeta"), tool("alpha"), tool("mid_1")])
            .unwrap();

        let names: Vec<_> = registry.list_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid_1"]);
    }

    #[test]
    fn test_duplicate_registration_is_atomic() {
        let mut registry = ToolRegistry::new();
        registry.register(tool("echo")).unwrap();

        let err = registry
            .register_all(vec![tool("fresh"), tool("echo")])
            .unwrap_err();
        assert!(matches!(err, McpError::DuplicateTool(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("fresh"));
    }

    #[test]
    fn test_duplicate_within_batch_rejected() {
        let mut registry = ToolRegistry::new();
        let err = registry.register_all(vec![tool("a"), tool("a")]).unwrap_err();
        assert!(matches!(err, McpError::DuplicateTool(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_definitions_rejected() {
        let mut registry = ToolRegistry::new();
        for name in ["", "1tool", "has-dash", "with space"] {
            let err = registry.register(tool(name)).unwrap_err();
            assert!(matches!(err, McpError::InvalidTool { .. }), "{name}");
        }

        let blank = Arc::new(FixedTool {
            name: "blank",
            description: "  ",
        });
        assert!(registry.register(blank).is_err());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.invoke("missing", Value::Null).await.unwrap_err();
        assert!(matches!(err, McpError::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn test_panic_becomes_error_envelope() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(PanickingTool)).unwrap();
        registry.register(tool("after")).unwrap();

        let result = registry.invoke("explode", json!({})).await.unwrap();
        assert!(result.is_error());
        assert!(result.text_content().contains("explode"));

        let result = registry.invoke("after", json!({})).await.unwrap();
        assert!(!result.is_error());
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct PageArgs {
        limit: Option<u32>,
        callback_url: Option<String>,
    }

    impl ToolArguments for PageArgs {
        fn validate(&self) -> Result<(), String> {
            if let Some(limit) = self.limit {
                check_range("limit", limit, 1, 50)?;
            }
            if let Some(url) = &self.callback_url {
                check_uri("callbackUrl", url)?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_parse_arguments() {
        let args: PageArgs = parse_arguments("page", Value::Null).unwrap();
        assert!(args.limit.is_none());

        let args: PageArgs = parse_arguments("page", json!({"limit": 50, "other": 1})).unwrap();
        assert_eq!(args.limit, Some(50));

        for bad in [
            json!({"limit": 51}),
            json!({"limit": 0}),
            json!({"limit": "ten"}),
            json!({"callbackUrl": "not a url"}),
            json!([1, 2]),
        ] {
            let err = parse_arguments::<PageArgs>("page", bad.clone()).unwrap_err();
            assert!(matches!(err, ToolError::Validation { .. }), "{bad}");
        }
    }

    #[test]
    fn test_nullable_schema() {
        let schema = nullable(json_schema_enum("mode", &["a", "b"]));
        assert_eq!(schema["type"], json!(["string", "null"]));
        assert_eq!(schema["enum"], json!(["a", "b", null]));
    }
}
