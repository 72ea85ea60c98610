//! OpenAI-compatible chat completions (used for DeepSeek).
//!
//! Tool calls arrive as `{function: {name, arguments: "<json string>"}}`.

use super::{missing_key, normalize_tool_call, ModelClient};
use crate::config::ProviderConfig;
use crate::tools::ToolDefinition;
use crate::types::*;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client for any `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    provider: String,
    env_var: String,
    api_key: Option<String>,
    config: ProviderConfig,
    http: reqwest::Client,
}

// -- OpenAI-compatible request/response types --------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<MessagePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolPayload<'a>>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct MessagePayload {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCallPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ToolPayload<'a> {
    r#type: &'a str,
    function: FunctionPayload<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionPayload<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolCallPayload {
    id: String,
    r#type: &'static str,
    function: FunctionCallPayload,
}

#[derive(Debug, Serialize)]
struct FunctionCallPayload {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl OpenAiClient {
    /// Create a client. A missing key is only reported when a call is made.
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

    fn message_payload(m: &ChatMessage) -> MessagePayload {
        let tool_calls = if m.tool_calls.is_empty() {
            None
        } else {
            Some(
                m.tool_calls
                    .iter()
                    .map(|tc| ToolCallPayload {
                        id: tc.id.clone(),
                        r#type: "function",
                        function: FunctionCallPayload {
                            name: tc.name.clone(),
                            arguments: tc.arguments.to_string(),
                        },
                    })
                    .collect(),
            )
        };

        MessagePayload {
            role: match m.role {
                ChatRole::System => "system",
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
                ChatRole::Tool => "tool",
            },
            content: Some(m.content.clone()),
            tool_calls,
            tool_call_id: m.tool_call_id.clone(),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
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

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        // Convert tool definitions
        let tool_payloads: Option<Vec<ToolPayload>> = if tools.is_empty() {
            None
        } else {
            Some(
                tools
                    .iter()
                    .map(|t| ToolPayload {
                        r#type: "function",
                        function: FunctionPayload {
                            name: &t.name,
                            description: &t.description,
                            parameters: &t.parameters,
                        },
                    })
                    .collect(),
            )
        };

        let request = ChatRequest {
            model: &self.config.model,
            messages: messages.iter().map(Self::message_payload).collect(),
            tools: tool_payloads,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("{} request to model: {}", self.provider, self.config.model);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .context("Inference request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Inference failed ({}): {}", status, body);
        }

        let body: ChatResponse = resp.json().await.context("Failed to parse inference response")?;
        Ok(into_model_response(body))
    }
}

fn into_model_response(body: ChatResponse) -> ModelResponse {
    let message = body
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .unwrap_or_default();

    let tool_calls = message
        .tool_calls
        .iter()
        .filter_map(normalize_tool_call)
        .collect();

    let usage = body
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    ModelResponse {
        content: message.content.filter(|c| !c.is_empty()),
        tool_calls,
        usage,
    }
}
