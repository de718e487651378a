//! sw_fetch tool implementation.
//!
//! Delivers an intercepted request to the worker. Requests the worker passes
//! through are performed against the network directly, as the host would.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use routine_core::{CacheStorage, Fetch, Headers, Request, RequestMode, Response};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;
use crate::worker::{EffectLog, FetchOutcome, OfflineWorker, ResponseSource};

/// Input parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Request URL, absolute or relative to the worker scope.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: "navigate" for top-level page loads.
    #[serde(default)]
    pub mode: Option<RequestMode>,

    /// Optional Accept header.
    #[serde(default)]
    pub accept: Option<String>,

    /// Extra request headers, forwarded as given.
    #[serde(default)]
    pub headers: Headers,

    /// Request body text, for methods that carry one.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// How the request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handling {
    /// The worker answered.
    Worker,
    /// The worker declined and the request went straight to the network.
    Passthrough,
}

/// Response as reported to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSummary {
    pub url: String,
    pub status: u16,
    pub headers: Headers,
    pub body: String,
    pub body_bytes: usize,
}

impl From<&Response> for ResponseSummary {
    fn from(response: &Response) -> Self {
        Self {
            url: response.url.clone(),
            status: response.status,
            headers: response.headers.clone(),
            body: response.text(),
            body_bytes: response.body.len(),
        }
    }
}

/// Output structure for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwFetchOutput {
    pub url: String,
    pub method: String,
    pub handled_by: Handling,
    /// Set when the worker answered.
    pub source: Option<ResponseSource>,
    /// Absent when a static asset could not be resolved at all.
    pub response: Option<ResponseSummary>,
    /// A copy of the response is being written to the current generation in
    /// the background; the reply does not wait for it.
    pub write_back_scheduled: bool,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl<S, F>(
    worker: &OfflineWorker<S, F, EffectLog>, params: SwFetchParams,
) -> Result<CallToolResult, McpError>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
{
    if params.method.trim().is_empty() {
        return Err(ToolError::InvalidInput("method cannot be empty".into()).into());
    }

    let url = worker.settings().resolve(&params.url)?;
    let mut request = Request::get(url).with_method(params.method.trim());
    if let Some(mode) = params.mode {
        request = request.with_mode(mode);
    }
    for (name, value) in &params.headers {
        request = request.with_header(name, value);
    }
    if let Some(accept) = params.accept.as_deref() {
        request = request.with_header("accept", accept);
    }
    if let Some(body) = params.body {
        request = request.with_body(body);
    }

    let url = request.url.to_string();
    let method = request.method.clone();

    let output = match worker.handle_fetch(request.clone()).await {
        FetchOutcome::Passthrough => {
            let response = worker.network().fetch(&request).await?;
            SwFetchOutput {
                url,
                method,
                handled_by: Handling::Passthrough,
                source: None,
                response: Some(ResponseSummary::from(&response)),
                write_back_scheduled: false,
            }
        }
        // Dropping the outcome detaches any pending write-back.
        outcome => SwFetchOutput {
            url,
            method,
            handled_by: Handling::Worker,
            source: outcome.source(),
            response: outcome.response().map(ResponseSummary::from),
            write_back_scheduled: matches!(outcome, FetchOutcome::Respond { write_back: Some(_), .. }),
        },
    };

    json_result(&output)
}
