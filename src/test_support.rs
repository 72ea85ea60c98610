//! In-memory model and tool doubles for unit tests.

use crate::inference::ModelClient;
use crate::tools::{ParamKind, ParamSpec, Tool, ToolDefinition, ToolSpec};
use crate::types::{ChatMessage, ModelResponse, ToolCall};
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays canned responses in order; once exhausted, echoes the last
/// message's content back as `"<provider>: <content>"`.
pub struct ScriptedModel {
    provider: String,
    replies: Mutex<VecDeque<Result<ModelResponse, String>>>,
    pub calls: Mutex<Vec<(Vec<ChatMessage>, usize)>>,
}

impl ScriptedModel {
    pub fn new(provider: &str, replies: Vec<ModelResponse>) -> Self {
        Self {
            provider: provider.to_string(),
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn arc(provider: &str, replies: Vec<ModelResponse>) -> Arc<dyn ModelClient> {
        Arc::new(Self::new(provider, replies))
    }

    /// A model whose every call fails.
    pub fn failing(provider: &str, message: &str) -> Self {
        let model = Self::new(provider, vec![]);
        model
            .replies
            .lock()
            .unwrap()
            .extend(std::iter::repeat(Err(message.to_string())).take(16));
        model
    }
}

/// Text-only reply.
pub fn text(content: &str) -> ModelResponse {
    ModelResponse {
        content: Some(content.to_string()),
        ..Default::default()
    }
}

/// Reply proposing the given calls.
pub fn calls(proposed: &[(&str, Value)]) -> ModelResponse {
    ModelResponse {
        content: None,
        tool_calls: proposed
            .iter()
            .enumerate()
            .map(|(i, (name, args))| ToolCall {
                id: format!("call_{}", i),
                name: name.to_string(),
                arguments: args.clone(),
            })
            .collect(),
        ..Default::default()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), tools.len()));

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => bail!("{}", message),
            None => {
                let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
                Ok(text(&format!("{}: {}", self.provider, last)))
            }
        }
    }
}

/// Tool returning `"<name>(<args json>)"`, or failing when told to.
pub struct EchoTool {
    spec: ToolSpec,
    fail_with: Option<String>,
}

impl EchoTool {
    pub fn arc(name: &str) -> Arc<dyn Tool> {
        Arc::new(Self {
            spec: ToolSpec {
                name: name.to_string(),
                description: format!("echo for {}", name),
                params: vec![ParamSpec::required("query", ParamKind::String, "input")],
            },
            fail_with: None,
        })
    }

    pub fn failing(name: &str, message: &str) -> Arc<dyn Tool> {
        Arc::new(Self {
            spec: ToolSpec {
                name: name.to_string(),
                description: format!("failing {}", name),
                params: vec![],
            },
            fail_with: Some(message.to_string()),
        })
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        if let Some(message) = &self.fail_with {
            bail!("{}", message);
        }
        Ok(format!("{}({})", self.spec.name, args))
    }
}
