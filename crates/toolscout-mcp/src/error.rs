//! Error types for the MCP server.

use crate::protocol::{codes, mcp_codes, JsonRpcError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, McpError>;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scan error: {0}")]
    Scan(#[from] toolscout_analysis::ScanError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
}

/// Failures raised while dispatching a `tools/call`.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<ToolError> for JsonRpcError {
    fn from(error: ToolError) -> Self {
        let code = match &error {
            ToolError::NotFound(_) => mcp_codes::TOOL_NOT_FOUND,
            ToolError::InvalidInput(_) => codes::INVALID_PARAMS,
            ToolError::ExecutionFailed(_) => codes::INTERNAL_ERROR,
        };
        JsonRpcError::new(code, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_codes() {
        let err: JsonRpcError = ToolError::NotFound("x".into()).into();
        assert_eq!(err.code, -32004);
        let err: JsonRpcError = ToolError::InvalidInput("bad".into()).into();
        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "Invalid input: bad");
    }
}
