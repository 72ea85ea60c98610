//! Anthropic Messages API (used for Claude).
//!
//! System prompts travel in a separate `system` field, tool calls come back
//! as `tool_use` content blocks and tool results go out as `tool_result`
//! blocks inside a user message.

use super::{missing_key, normalize_tool_call, ModelClient};
use crate::config::ProviderConfig;
use crate::tools::ToolDefinition;
use crate::types::*;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    provider: String,
    env_var: String,
    api_key: Option<String>,
    config: ProviderConfig,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct ToolPayload<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<Value>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicClient {
    pub fn new(
        http: reqwest::Client,
        provider: &str,
        env_var: &str,
        api_key: Option<String>,
        config: ProviderConfig,
    ) -> Self {
        Self {
            provider: provider.to_string(),
            env_var: env_var.to_string(),
            api_key,
            config,
            http,
        }
    }
}

/// Split system text out and convert the rest into Anthropic message objects.
fn build_messages(messages: &[ChatMessage]) -> (Option<String>, Vec<Value>) {
    let mut system = Vec::new();
    let mut out = Vec::new();

    for m in messages {
        match m.role {
            ChatRole::System => system.push(m.content.as_str()),
            ChatRole::User => out.push(json!({"role": "user", "content": m.content})),
            ChatRole::Assistant => {
                let mut blocks = Vec::new();
                if !m.content.is_empty() {
                    blocks.push(json!({"type": "text", "text": m.content}));
                }
                for tc in &m.tool_calls {
                    blocks.push(json!({
                        "type": "tool_use",
                        "id": tc.id,
                        "name": tc.name,
                        "input": tc.arguments,
                    }));
                }
                out.push(json!({"role": "assistant", "content": blocks}));
            }
            ChatRole::Tool => out.push(json!({
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": m.tool_call_id.clone().unwrap_or_default(),
                    "content": m.content,
                }],
            })),
        }
    }

    let system = if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    };
    (system, out)
}

fn into_model_response(body: MessagesResponse) -> ModelResponse {
    let mut text = Vec::new();
    let mut tool_calls = Vec::new();

    for block in &body.content {
        match block["type"].as_str() {
            Some("text") => {
                if let Some(t) = block["text"].as_str() {
                    text.push(t);
                }
            }
            Some("tool_use") => tool_calls.extend(normalize_tool_call(block)),
            _ => {}
        }
    }

    let usage = body
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: u.input_tokens + u.output_tokens,
        })
        .unwrap_or_default();

    let content = text.concat();
    ModelResponse {
        content: (!content.is_empty()).then_some(content),
        tool_calls,
        usage,
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelResponse> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(missing_key(&self.provider, &self.env_var));
        };

        let (system, payload) = build_messages(messages);
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system,
            messages: payload,
            tools: tools
                .iter()
                .map(|t| ToolPayload {
                    name: &t.name,
                    description: &t.description,
                    input_schema: &t.parameters,
                })
                .collect(),
        };

        debug!("{} request to model: {}", self.provider, self.config.model);

        let resp = self
            .http
            .post(format!(
                "{}/v1/messages",
                self.config.base_url.trim_end_matches('/')
            ))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .context("Inference request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Inference failed ({}): {}", status, body);
        }

        let body: MessagesResponse =
            resp.json().await.context("Failed to parse inference response")?;
        Ok(into_model_response(body))
    }
}
