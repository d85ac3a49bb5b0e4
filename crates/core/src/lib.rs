// Core types shared by the Meeting BaaS SDK and the MCP adapter

pub mod nullable;
pub mod types;

pub use nullable::Nullable;
pub use types::*;
