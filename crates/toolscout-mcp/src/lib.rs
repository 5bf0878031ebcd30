//! Model Context Protocol server for toolscout.
//!
//! Exposes three tools to MCP clients:
//!
//! - `recommend_tools`: rank discovered tools against a task description
//! - `list_tools`: list discovered tools without their code
//! - `scan_tools_directory`: rescan a directory and replace the tool table
//!
//! The server speaks JSON-RPC 2.0 over line-delimited stdio or HTTP POST.

pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use error::{McpError, Result, ToolError};
pub use protocol::{CallToolResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::McpServer;
pub use tools::{Tool, ToolContext};
pub use transport::{HttpTransport, StdioTransport};
