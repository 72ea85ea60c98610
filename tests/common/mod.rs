//! Shared doubles for the integration tests.

#![allow(dead_code)]

use anyhow::{bail, Result};
use askroute::config::AskrouteConfig;
use askroute::context::{AppContext, ModelSet};
use askroute::inference::ModelClient;
use askroute::session::ChatService;
use askroute::tools::summarizer::SummarizeTool;
use askroute::tools::{ParamKind, ParamSpec, Tool, ToolDefinition, ToolRegistry, ToolSpec};
use askroute::types::{ChatMessage, ModelResponse, ToolCall};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Model that replays a fixed list of responses, then answers "ok".
pub struct CannedModel {
    provider: String,
    replies: Mutex<VecDeque<ModelResponse>>,
    pub seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl CannedModel {
    pub fn new(provider: &str, replies: Vec<ModelResponse>) -> Arc<Self> {
        Arc::new(Self {
            provider: provider.to_string(),
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ModelClient for CannedModel {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn generate(&self, messages: &[ChatMessage], _tools: &[ToolDefinition]) -> Result<ModelResponse> {
        self.seen.lock().unwrap().push(messages.to_vec());
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or_else(|| answer("ok")))
    }
}

pub fn answer(content: &str) -> ModelResponse {
    ModelResponse {
        content: Some(content.to_string()),
        ..Default::default()
    }
}

pub fn call(name: &str, arguments: Value) -> ModelResponse {
    ModelResponse {
        content: None,
        tool_calls: vec![ToolCall {
            id: "call_0".into(),
            name: name.into(),
            arguments,
        }],
        ..Default::default()
    }
}

/// Search stand-in returning a canned result document, or failing.
pub struct FakeSearch {
    spec: ToolSpec,
    fail: bool,
}

impl FakeSearch {
    pub fn new() -> Arc<Self> {
        Self::build(false)
    }

    pub fn failing() -> Arc<Self> {
        Self::build(true)
    }

    fn build(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            spec: ToolSpec {
                name: "tavily_search_tool".into(),
                description: "Search the web".into(),
                params: vec![
                    ParamSpec::required("query", ParamKind::String, "Search query"),
                    ParamSpec::optional("top_n", ParamKind::Integer, "Results to keep", json!(2)),
                ],
            },
            fail,
        })
    }
}

#[async_trait]
impl Tool for FakeSearch {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        if self.fail {
            bail!("search backend timed out");
        }
        let query = args["query"].as_str().unwrap_or_default();
        let body = json!({
            "query": query,
            "results": [
                {"title": "Forecast", "content": "Sunny with a light breeze and a high near 72 degrees. ".repeat(30)},
                {"title": "Alerts", "content": "No active alerts."}
            ]
        });
        Ok(serde_json::to_string_pretty(&body)?)
    }
}

/// Chat service over a registry holding the summarizer plus `extra`.
pub fn service(model: Arc<CannedModel>, extra: Vec<Arc<dyn Tool>>) -> ChatService {
    let mut builder = ToolRegistry::builder().register(Arc::new(SummarizeTool::default()));
    for tool in extra {
        builder = builder.register(tool);
    }
    let models = ModelSet::new().with("deepseek", "DeepSeek", model);
    let ctx = AppContext::new(AskrouteConfig::default(), models, builder.build());
    ChatService::new(Arc::new(ctx), "deepseek").expect("deepseek is registered")
}
