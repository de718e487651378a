//! Errors raised by the MCP bridge itself.
//!
//! Worker and cache failures travel as `routine_core::Error`; these cover
//! malformed tool input and output encoding.

use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool arguments that cannot become a worker event.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Tool output could not be encoded.
    #[error("SERIALIZE_FAILED: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let (code, message) = match &err {
            ToolError::InvalidInput(msg) => (-32602, msg.clone()),
            ToolError::Serialize(e) => (-32603, e.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
