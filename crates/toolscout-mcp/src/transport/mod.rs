//! Transports carrying JSON-RPC messages to and from [`McpServer`](crate::McpServer).

pub mod http;
pub mod stdio;

pub use http::HttpTransport;
pub use stdio::StdioTransport;
