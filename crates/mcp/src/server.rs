//! MCP server implementation.
//!
//! Wraps a `ToolRegistry` and answers JSON-RPC messages from any transport.
//! Requests are handled concurrently; responses are written in completion
//! order.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::McpError;
use crate::protocol::*;
use crate::tools::ToolRegistry;
use crate::transport::McpTransport;

pub const DEFAULT_SERVER_NAME: &str = "Meeting BaaS Server";

/// Responses waiting to be written by the run loop.
const OUTBOUND_BUFFER: usize = 64;

/// MCP server that bridges a `ToolRegistry` to MCP clients.
pub struct McpServer {
    name: String,
    version: String,
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            registry: ToolRegistry::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ToolRegistry {
        &mut self.registry
    }

    /// Run the server loop until the transport closes.
    ///
    /// Each request runs on its own task. After the peer closes, responses
    /// still in flight are written before returning.
    pub async fn run<T: McpTransport>(self: Arc<Self>, transport: &mut T) -> Result<(), McpError> {
        tracing::info!(server = %self.name, tools = self.registry.len(), "MCP server starting");

        let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);
        let mut tx = Some(tx);

        loop {
            tokio::select! {
                incoming = transport.receive(), if tx.is_some() => {
                    match incoming {
                        Ok(Some(line)) => {
                            tracing::debug!(message = %line, "Received message");
                            if let Some(tx) = &tx {
                                let server = Arc::clone(&self);
                                let tx = tx.clone();
                                tokio::spawn(async move {
                                    if let Some(response) = server.handle_message(&line).await {
                                        // Receiver only goes away when run() returned early.
                                        let _ = tx.send(response).await;
                                    }
                                });
                            }
                        }
                        Ok(None) => {
                            tracing::info!("Transport closed, finishing in-flight requests");
                            tx = None;
                        }
                        Err(err @ McpError::MalformedMessage(_)) => {
                            tracing::warn!(error = %err, "Rejected unreadable message");
                            let response = JsonRpcResponse::error(Value::Null, err.to_rpc_error());
                            if let Some(encoded) = encode(&response) {
                                transport.send(&encoded).await?;
                            }
                        }
                        Err(err) => return Err(err),
                    }
                }
                outgoing = rx.recv() => {
                    match outgoing {
                        Some(response) => {
                            tracing::debug!(response = %response, "Sending response");
                            transport.send(&response).await?;
                        }
                        None => break,
                    }
                }
            }
        }

        tracing::info!(server = %self.name, "MCP server stopped");
        Ok(())
    }

    /// Handle one raw JSON-RPC message.
    ///
    /// Returns the serialized response, or `None` for notifications.
    pub async fn handle_message(&self, message: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(message) {
            Ok(raw) => self.handle_value(raw).await?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON");
                JsonRpcResponse::error(Value::Null, McpError::JsonParse(e).to_rpc_error())
            }
        };

        encode(&response)
    }

    async fn handle_value(&self, raw: Value) -> Option<JsonRpcResponse> {
        if !raw.is_object() {
            return Some(JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::invalid_request(),
            ));
        }

        let id = raw.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed JSON-RPC message");
                return id.map(|id| JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
            }
        };

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id.unwrap_or(Value::Null),
                JsonRpcError::invalid_request(),
            ));
        }

        Some(self.handle_request(request).await)
    }

    /// Handle a single JSON-RPC request and produce a response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);

        match request.method.as_str() {
            "initialize" => respond(id, self.handle_initialize(request.params)),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => respond(id, Ok(self.handle_list_tools())),
            "tools/call" => respond(id, self.handle_call_tool(request.params).await),
            method => {
                tracing::warn!(method = %method, "Unknown method");
                JsonRpcResponse::error(id, McpError::MethodNotFound(method.to_string()).to_rpc_error())
            }
        }
    }

    fn handle_notification(&self, notification: &JsonRpcRequest) {
        match notification.method.as_str() {
            "notifications/initialized" => tracing::info!("Client confirmed initialization"),
            "notifications/cancelled" => tracing::debug!("Client cancelled a request"),
            method => tracing::debug!(method = %method, "Ignoring notification"),
        }
    }

    fn handle_initialize(&self, params: Option<Value>) -> Result<InitializeResult, McpError> {
        let params: InitializeParams = match params {
            Some(params) => serde_json::from_value(params)
                .map_err(|e| McpError::InvalidParams(e.to_string()))?,
            None => InitializeParams::default(),
        };

        let protocol_version = negotiate_protocol_version(params.protocol_version.as_deref());
        tracing::info!(
            client = params.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
            protocol_version = %protocol_version,
            "Handling initialize"
        );

        Ok(InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.name.clone(),
                version: self.version.clone(),
            },
        })
    }

    fn handle_list_tools(&self) -> ListToolsResult {
        ListToolsResult {
            tools: self.registry.list_schemas(),
        }
    }

    async fn handle_call_tool(&self, params: Option<Value>) -> Result<CallToolResult, McpError> {
        let params = params.ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
        let call: CallToolParams =
            serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        tracing::debug!(tool = %call.name, "Calling tool");
        self.registry.invoke(&call.name, call.arguments).await
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_NAME, env!("CARGO_PKG_VERSION"))
    }
}

fn respond<T: Serialize>(id: Value, result: Result<T, McpError>) -> JsonRpcResponse {
    match result.and_then(|value| serde_json::to_value(value).map_err(McpError::from)) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, e.to_rpc_error()),
    }
}

fn encode(response: &JsonRpcResponse) -> Option<String> {
    match serde_json::to_string(response) {
        Ok(encoded) => Some(encoded),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::register_tools_with_client;
    use crate::transport::{ChannelTransport, LineTransport};
    use baas_sdk::BaasClient;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_for(remote: &MockServer) -> McpServer {
        let client = BaasClient::builder()
            .base_url(remote.uri())
            .api_key("test-key")
            .build()
            .unwrap();
        let mut server = McpServer::default();
        register_tools_with_client(&mut server, &client).unwrap();
        server
    }

    async fn call(server: &McpServer, message: Value) -> Value {
        let response = server.handle_message(&message.to_string()).await.unwrap();
        serde_json::from_str(&response).unwrap()
    }

    fn tool_call(id: u64, name: &str, arguments: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        })
    }

    #[tokio::test]
    async fn test_initialize() {
        let remote = MockServer::start().await;
        let server = server_for(&remote);

        let response = call(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "inspector", "version": "1.0"}
                }
            }),
        )
        .await;

        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(response["result"]["serverInfo"]["name"], "Meeting BaaS Server");
        assert_eq!(response["result"]["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    async fn test_ping_and_notifications() {
        let remote = MockServer::start().await;
        let server = server_for(&remote);

        let response = call(&server, json!({"jsonrpc": "2.0", "id": "p", "method": "ping"})).await;
        assert_eq!(response["result"], json!({}));

        let notification = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        assert!(server.handle_message(&notification.to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_tools_list_has_unique_names() {
        let remote = MockServer::start().await;
        let server = server_for(&remote);

        let response = call(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        let tools = response["result"]["tools"].as_array().unwrap();
        let names: HashSet<_> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();

        assert_eq!(tools.len(), 19);
        assert_eq!(names.len(), tools.len());
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_echo_call() {
        let remote = MockServer::start().await;
        let server = server_for(&remote);

        let response = call(&server, tool_call(3, "echo", json!({"message": "ping"}))).await;
        assert_eq!(
            response["result"],
            json!({"content": [{"type": "text", "text": "Tool echo: ping"}]})
        );
    }

    #[tokio::test]
    async fn test_schema_violation_is_invalid_params() {
        let remote = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&remote)
            .await;
        let server = server_for(&remote);

        let response = call(&server, tool_call(4, "listRecentBots", json!({"limit": 51}))).await;
        assert_eq!(response["error"]["code"], error_codes::INVALID_PARAMS);
        assert!(response.get("result").is_none());
    }

    #[tokio::test]
    async fn test_remote_failure_then_recovery() {
        let remote = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "database unavailable"})))
            .up_to_n_times(1)
            .mount(&remote)
            .await;
        Mock::given(method("GET"))
            .and(path("/calendars/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&remote)
            .await;
        let server = server_for(&remote);

        let failed = call(&server, tool_call(5, "listCalendars", json!({}))).await;
        assert_eq!(failed["result"]["isError"], true);
        let text = failed["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Error: Failed to list calendars"));
        assert!(text.contains("database unavailable"));

        let recovered = call(&server, tool_call(6, "listCalendars", json!({}))).await;
        assert!(recovered["result"].get("isError").is_none());
        assert_eq!(recovered["result"]["content"][0]["text"], "[]");
    }

    #[tokio::test]
    async fn test_missing_api_key_yields_error_envelope() {
        let remote = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "missing api key"})))
            .mount(&remote)
            .await;

        let client = BaasClient::builder().base_url(remote.uri()).build().unwrap();
        let mut server = McpServer::default();
        register_tools_with_client(&mut server, &client).unwrap();

        let response = call(&server, tool_call(7, "listCalendars", Value::Null)).await;
        assert_eq!(response["result"]["isError"], true);
        assert!(response["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Authentication failed"));
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let remote = MockServer::start().await;
        let server = server_for(&remote);

        let response: Value =
            serde_json::from_str(&server.handle_message("{not json").await.unwrap()).unwrap();
        assert_eq!(response["error"]["code"], error_codes::PARSE_ERROR);
        assert!(response["id"].is_null());

        let response = call(&server, json!({"jsonrpc": "2.0", "id": 8, "method": "resources/list"})).await;
        assert_eq!(response["error"]["code"], error_codes::METHOD_NOT_FOUND);

        let response = call(&server, tool_call(9, "noSuchTool", json!({}))).await;
        assert_eq!(response["error"]["code"], error_codes::INVALID_PARAMS);

        let response = call(&server, json!({"jsonrpc": "2.0", "id": 10, "method": "tools/call"})).await;
        assert_eq!(response["error"]["code"], error_codes::INVALID_PARAMS);

        let response = call(&server, json!([1, 2])).await;
        assert_eq!(response["error"]["code"], error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_run_flushes_responses_after_close() {
        let remote = MockServer::start().await;
        let server = Arc::new(server_for(&remote));

        let (client, server_side) = tokio::io::duplex(8192);
        let (server_read, server_write) = tokio::io::split(server_side);
        let mut transport = LineTransport::new(server_read, server_write);
        let (client_read, mut client_write) = tokio::io::split(client);

        let request = tool_call(1, "echo", json!({"message": "last"}));
        client_write
            .write_all(format!("{request}\n").as_bytes())
            .await
            .unwrap();
        client_write.shutdown().await.unwrap();

        server.run(&mut transport).await.unwrap();

        let mut lines = BufReader::new(client_read).lines();
        let response: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["content"][0]["text"], "Tool echo: last");
    }

    #[tokio::test]
    async fn test_run_answers_unreadable_line_and_keeps_serving() {
        let remote = MockServer::start().await;
        let server = Arc::new(server_for(&remote));

        let (client, server_side) = tokio::io::duplex(8192);
        let (server_read, server_write) = tokio::io::split(server_side);
        let mut transport = LineTransport::new(server_read, server_write);
        let (client_read, mut client_write) = tokio::io::split(client);

        let ping = json!({"jsonrpc": "2.0", "id": 2, "method": "ping"});
        client_write.write_all(b"\xff\xfe garbage\n").await.unwrap();
        client_write
            .write_all(format!("{ping}\n").as_bytes())
            .await
            .unwrap();
        client_write.shutdown().await.unwrap();

        server.run(&mut transport).await.unwrap();

        let mut lines = BufReader::new(client_read).lines();
        let rejected: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(rejected["id"], Value::Null);
        assert_eq!(rejected["error"]["code"], error_codes::PARSE_ERROR);

        let pong: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(pong["id"], 2);
        assert_eq!(pong["result"], json!({}));
    }

    #[tokio::test]
    async fn test_slow_call_does_not_block_others() {
        let remote = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])).set_delay(Duration::from_secs(30)))
            .mount(&remote)
            .await;
        let server = Arc::new(server_for(&remote));
        let (mut client, mut server_end) = ChannelTransport::pair();

        tokio::spawn(async move {
            let _ = server.run(&mut server_end).await;
        });

        client
            .send(&tool_call(1, "listCalendars", json!({})).to_string())
            .await
            .unwrap();
        client
            .send(&tool_call(2, "echo", json!({"message": "fast"})).to_string())
            .await
            .unwrap();

        let response = tokio::time::timeout(Duration::from_secs(5), client.receive())
            .await
            .expect("echo response delayed by slow call")
            .unwrap()
            .unwrap();
        let response: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(response["id"], 2);
        assert_eq!(response["result"]["content"][0]["text"], "Tool echo: fast");
    }
}
