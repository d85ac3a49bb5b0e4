// MCP (Model Context Protocol) server exposing the Meeting BaaS API as tools.
// Transports: newline-delimited stdio here, HTTP/SSE in the server binary.

pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use error::{McpError, ToolError};
pub use server::McpServer;
pub use tools::{register_tools, register_tools_with_client, Tool, ToolRegistry};
pub use transport::{ChannelTransport, LineTransport, McpTransport, StdioTransport};
