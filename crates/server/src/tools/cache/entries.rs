//! cache_entries tool implementation.
//!
//! Lists the request URLs stored in one generation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use routine_core::CacheStorage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::tools::json_result;

/// Parameters for the cache_entries tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheEntriesParams {
    /// Generation to list. Defaults to the current one.
    #[serde(default)]
    pub cache_name: Option<String>,
}

/// Output from the cache_entries tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntriesOutput {
    pub cache_name: String,
    pub urls: Vec<String>,
}

/// Implementation of the cache_entries tool.
pub async fn cache_entries_impl<S: CacheStorage>(
    storage: &S, current: &str, params: CacheEntriesParams,
) -> Result<CallToolResult, McpError> {
    let cache_name = params.cache_name.unwrap_or_else(|| current.to_string());
    if cache_name.trim().is_empty() {
        return Err(ToolError::InvalidInput("cache_name cannot be empty".into()).into());
    }

    let urls = storage.entries(&cache_name).await?;
    json_result(&CacheEntriesOutput { cache_name, urls })
}

#[cfg(test)]
mod tests {
    use super::*;
    use routine_core::{CacheDb, Request, Response};
    use url::Url;

    async fn seeded() -> CacheDb {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let request = Request::get(Url::parse("http://localhost:8080/index.html").unwrap());
        cache
            .put_entry("v1", &request, &Response::new("http://localhost:8080/index.html", 200, "index"))
            .await
            .unwrap();
        cache
    }

    #[tokio::test]
    async fn test_entries_default_to_current() {
        let cache = seeded().await;

        let result = cache_entries_impl(&cache, "v1", CacheEntriesParams { cache_name: None }).await.unwrap();
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        let output: CacheEntriesOutput = serde_json::from_str(text).unwrap();

        assert_eq!(output.cache_name, "v1");
        assert_eq!(output.urls, vec!["http://localhost:8080/index.html"]);
    }

    #[tokio::test]
    async fn test_entries_missing_store() {
        let cache = seeded().await;
        let params = CacheEntriesParams { cache_name: Some("v0".into()) };

        let err = cache_entries_impl(&cache, "v1", params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_entries_blank_name_rejected() {
        let cache = seeded().await;
        let params = CacheEntriesParams { cache_name: Some("  ".into()) };

        assert!(cache_entries_impl(&cache, "v1", params).await.is_err());
    }
}
