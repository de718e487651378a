//! cache_keys tool implementation.
//!
//! Lists cache generations in creation order.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use routine_core::CacheStorage;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheKeysOutput {
    /// Generation the running worker writes to.
    pub current: String,
    /// Every generation, oldest first.
    pub keys: Vec<String>,
}

/// Implementation of the cache_keys tool.
pub async fn cache_keys_impl<S: CacheStorage>(storage: &S, current: &str) -> Result<CallToolResult, McpError> {
    let keys = storage.keys().await?;
    json_result(&CacheKeysOutput { current: current.to_string(), keys })
}
