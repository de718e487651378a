//! MCP tool implementations.
//!
//! Each tool delivers one event to the worker and reports what happened,
//! including the host effects the worker requested along the way.

pub mod cache;
pub mod events;
pub mod lifecycle;
pub mod sw_fetch;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

pub use cache::{CacheEntriesParams, cache_entries_impl, cache_keys_impl};
pub use events::{NotificationClickParams, PushParams, SyncParams};
pub use sw_fetch::SwFetchParams;

/// Encode tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use rmcp::model::CallToolResult;
    use serde_json::Value;

    /// Parse the JSON text of a tool result.
    pub(crate) fn output_json(result: &CallToolResult) -> Value {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
