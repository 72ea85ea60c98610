//! Model providers.
//!
//! Every provider answers `generate(messages, tools)` with a [`ModelResponse`]
//! whose tool calls are already in canonical `{id, name, arguments}` shape.

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;

use crate::tools::ToolDefinition;
use crate::types::{ChatMessage, ModelResponse, ToolCall};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A chat model that may propose tool calls.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Provider identifier, also used as an invocation node name.
    fn provider(&self) -> &str;

    /// Generate a reply. An empty `tools` slice disables tool binding.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelResponse>;
}

/// Normalize a provider-specific tool call into the canonical shape.
///
/// Accepts the OpenAI form `{id, function: {name, arguments: "<json>"}}`,
/// the Anthropic form `{id, name, input: {...}}` and the flat form
/// `{id, name, args}`. Arguments given as a JSON string are parsed; an
/// unparseable string becomes an empty object.
pub fn normalize_tool_call(raw: &Value) -> Option<ToolCall> {
    let (name, args) = match raw.get("function") {
        Some(function) => (function.get("name")?, function.get("arguments")),
        None => (
            raw.get("name")?,
            raw.get("input").or_else(|| raw.get("args")),
        ),
    };

    let arguments = match args {
        Some(Value::String(s)) => serde_json::from_str(s).unwrap_or_else(|_| empty_args()),
        Some(Value::Null) | None => empty_args(),
        Some(other) => other.clone(),
    };

    Some(ToolCall {
        id: raw
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        name: name.as_str()?.to_string(),
        arguments,
    })
}

/// Plain completion without tool binding; an empty reply is an error.
pub async fn complete(model: &dyn ModelClient, messages: &[ChatMessage]) -> Result<String> {
    let response = model.generate(messages, &[]).await?;
    response
        .content
        .ok_or_else(|| anyhow::anyhow!("{} returned no content", model.provider()))
}

fn empty_args() -> Value {
    Value::Object(Default::default())
}

/// Missing-credential error shared by providers.
pub(crate) fn missing_key(provider: &str, env_var: &str) -> anyhow::Error {
    anyhow::anyhow!("{} unavailable: {} is not configured", provider, env_var)
}
