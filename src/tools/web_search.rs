//! Web search through the Tavily API.
//!
//! Returns the raw response as pretty-printed JSON, with the `results` array
//! cut to `top_n` entries.

use super::traits::{str_arg, uint_arg, ParamKind, ParamSpec, Tool, ToolSpec};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

pub const NAME: &str = "tavily_search_tool";

pub const DEFAULT_TOP_N: u64 = 2;

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: u64,
}

pub struct WebSearchTool {
    spec: ToolSpec,
    base_url: String,
    api_key: Option<String>,
    default_top_n: u64,
    http: reqwest::Client,
}

impl WebSearchTool {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: Option<String>,
        default_top_n: u64,
    ) -> Self {
        Self {
            spec: ToolSpec {
                name: NAME.into(),
                description: "Web search using Tavily; returns JSON string of top_n results.".into(),
                params: vec![
                    ParamSpec::required("query", ParamKind::String, "Search query"),
                    ParamSpec::optional(
                        "top_n",
                        ParamKind::Integer,
                        "Number of results to keep",
                        json!(default_top_n),
                    ),
                ],
            },
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            default_top_n,
            http,
        }
    }
}

/// Keep at most `top_n` entries of the response's `results` array.
pub fn truncate_results(mut body: Value, top_n: u64) -> Value {
    if top_n > 0 {
        if let Some(results) = body.get_mut("results").and_then(Value::as_array_mut) {
            results.truncate(top_n as usize);
        }
    }
    body
}

#[async_trait]
impl Tool for WebSearchTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let query = str_arg(args, "query")?;
        let top_n = uint_arg(args, "top_n", self.default_top_n);

        let Some(api_key) = self.api_key.as_deref() else {
            bail!("web search unavailable: TAVILY_API_KEY is not configured");
        };

        debug!("Tavily search: {} (top_n={})", query, top_n);

        let resp = self
            .http
            .post(format!("{}/search", self.base_url))
            .bearer_auth(api_key)
            .json(&SearchRequest {
                query,
                max_results: top_n.max(1),
            })
            .send()
            .await
            .context("Tavily search request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Tavily search failed ({}): {}", status, body);
        }

        let body: Value = resp.json().await.context("Failed to parse search response")?;
        let body = truncate_results(body, top_n);

        serde_json::to_string_pretty(&body).context("Failed to serialize search results")
    }
}
