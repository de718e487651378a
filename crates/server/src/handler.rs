//! MCP server handler implementation.
//!
//! This module defines the server handler that delivers worker events as
//! tool calls and routes them to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    CacheEntriesParams, NotificationClickParams, PushParams, SwFetchParams, SyncParams, cache_entries_impl,
    cache_keys_impl, events, lifecycle, sw_fetch,
};
use crate::worker::SiteWorker;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The MCP server handler for the offline cache worker.
#[derive(Clone)]
pub struct WorkerServer {
    tool_router: ToolRouter<Self>,
    worker: Arc<SiteWorker>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl WorkerServer {
    pub fn new(worker: Arc<SiteWorker>) -> Self {
        Self { tool_router: Self::tool_router(), worker }
    }

    #[tool(description = "Deliver the install event: precache the manifest into the current cache generation.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        lifecycle::install_impl(&self.worker).await
    }

    #[tool(description = "Deliver the activate event: delete stale cache generations and claim open pages.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        lifecycle::activate_impl(&self.worker).await
    }

    /// Navigations go network-first, static assets cache-first, non-GET requests pass through.
    #[tool(description = "Deliver a fetch event. Returns the response and whether it came from the network, the cache, or an offline fallback.")]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        sw_fetch::fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a background sync event.")]
    async fn sw_sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        events::sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a periodic background sync event.")]
    async fn sw_periodic_sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        events::periodic_sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a push event. The payload may carry a JSON title and body for the notification.")]
    async fn sw_push(&self, params: Parameters<PushParams>) -> Result<CallToolResult, McpError> {
        events::push_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a notification click: close the notification and open the app.")]
    async fn sw_notification_click(
        &self, params: Parameters<NotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        events::notification_click_impl(&self.worker, params.0).await
    }

    #[tool(description = "List cache generation names in creation order.")]
    async fn cache_keys(&self) -> Result<CallToolResult, McpError> {
        cache_keys_impl(self.worker.storage(), &self.worker.settings().cache_name).await
    }

    #[tool(description = "List the request URLs stored in a cache generation (default: the current one).")]
    async fn cache_entries(&self, params: Parameters<CacheEntriesParams>) -> Result<CallToolResult, McpError> {
        cache_entries_impl(self.worker.storage(), &self.worker.settings().cache_name, params.0).await
    }
}

impl ServerHandler for WorkerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "routine-sw".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Offline cache worker. Call sw_install then sw_activate, then deliver requests with sw_fetch.".into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
