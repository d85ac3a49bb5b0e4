//! Transport layer for the Meeting BaaS SDK.

pub mod http;

pub use http::HttpTransport;
