//! Shared types used across the router, the executor and the providers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Intents and routing
// ---------------------------------------------------------------------------

/// Classification label selecting which handling path a message takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// One-sentence definition through the `define` template.
    Define,
    /// Word-limited summary of the message itself.
    Summarize,
    /// Markdown recipe through the `recipe` template.
    Recipe,
    /// Fallback: web search, then summarize the raw results.
    Default,
}

impl Intent {
    /// Template / policy key for this intent.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Define => "define",
            Self::Summarize => "summarize",
            Self::Recipe => "recipe",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where a routed request goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteTarget {
    /// No tool: the model's own content is the answer.
    Direct { content: String },
    /// A single named tool with its arguments.
    SingleTool {
        name: String,
        arguments: serde_json::Value,
    },
    /// A fixed chain run in order; each step consumes the previous output.
    /// Steps are tool names or `<key>_template` nodes.
    Chain { steps: Vec<String> },
}

/// Per-request routing decision, consumed once by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub intent: Option<Intent>,
    pub target: RouteTarget,
}

/// Which policy picks the route for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RoutingPolicy {
    /// Deterministic prefix / substring rules.
    #[default]
    Lexical,
    /// Ask the model, honoring its first proposed tool call.
    Model,
}

impl fmt::Display for RoutingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Model => write!(f, "model"),
        }
    }
}

// ---------------------------------------------------------------------------
// Inference types
// ---------------------------------------------------------------------------

/// A chat message in a model conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Set on assistant messages that proposed tool calls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Set on tool messages answering a specific call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Assistant message carrying the calls it proposed.
    pub fn assistant_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::new(ChatRole::Assistant, content)
        }
    }

    /// Tool result answering `call_id`.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::new(ChatRole::Tool, content)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool call request from the model, in canonical shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Result of invoking a tool through the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub output: String,
    pub success: bool,
}

/// Response from a model provider including potential tool calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
}

/// Token usage from an inference call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ---------------------------------------------------------------------------
// Invocation trail
// ---------------------------------------------------------------------------

/// One recorded step, used for explanation and diagram rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationEntry {
    pub ordinal: usize,
    pub name: String,
    pub input: String,
    pub output: String,
}

/// A completed request/response cycle as shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub query: String,
    pub model: String,
    pub policy: RoutingPolicy,
    /// What produced the answer (route description).
    pub raw: String,
    /// The final answer text.
    pub parsed: String,
    pub entries: Vec<InvocationEntry>,
    /// Distinct step names in first-seen order.
    pub used_tools: Vec<String>,
}
