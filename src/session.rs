//! Chat service and the in-memory session log.

use crate::context::AppContext;
use crate::error::RouteError;
use crate::router::{describe, Execution, Responder, RouteArgs};
use crate::types::{ConversationTurn, RoutingPolicy};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Entry point for one request/response cycle against a chosen model.
pub struct ChatService {
    ctx: Arc<AppContext>,
    model: String,
}

impl ChatService {
    /// Bind to `model`; fails when no such provider is configured.
    pub fn new(ctx: Arc<AppContext>, model: &str) -> Result<Self, RouteError> {
        ctx.models.get(model)?;
        Ok(Self {
            ctx,
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Route `message` with configured defaults.
    pub async fn chat(
        &self,
        message: &str,
        policy: RoutingPolicy,
    ) -> Result<ConversationTurn, RouteError> {
        self.chat_with(message, policy, &RouteArgs::default()).await
    }

    /// Route `message`; unset `args` fall back to configuration.
    pub async fn chat_with(
        &self,
        message: &str,
        policy: RoutingPolicy,
        args: &RouteArgs,
    ) -> Result<ConversationTurn, RouteError> {
        if message.trim().is_empty() {
            return Err(RouteError::EmptyMessage);
        }

        info!("Chat [{} / {}]: {}", self.model, policy, message.trim());
        let execution = match policy {
            RoutingPolicy::Lexical => {
                let responder =
                    Responder::new(self.ctx.executor(&self.model)?, self.ctx.default_args());
                let response = responder.respond_to(message, args).await;
                Execution {
                    route: response.route,
                    final_text: response.text,
                    entries: response.entries,
                }
            }
            RoutingPolicy::Model => self.ctx.model_router(&self.model)?.run(message).await,
        };

        let mut used_tools: Vec<String> = Vec::new();
        for entry in &execution.entries {
            if !used_tools.contains(&entry.name) {
                used_tools.push(entry.name.clone());
            }
        }

        Ok(ConversationTurn {
            id: ulid::Ulid::new().to_string(),
            created_at: Utc::now(),
            query: message.to_string(),
            model: self.model.clone(),
            policy,
            raw: describe(&execution.route),
            parsed: execution.final_text,
            entries: execution.entries,
            used_tools,
        })
    }
}

/// Append-only log of the turns in one session.
#[derive(Debug, Default)]
pub struct SessionLog {
    turns: Vec<ConversationTurn>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Markdown transcript: query heading, then fenced raw and parsed blocks.
    pub fn to_markdown(&self) -> String {
        let mut lines = Vec::new();
        for turn in &self.turns {
            lines.push(format!("## Query: {}", turn.query));
            lines.push("### Raw response".to_string());
            lines.push("```".to_string());
            lines.push(turn.raw.clone());
            lines.push("```".to_string());
            lines.push("### Parsed output".to_string());
            lines.push("```".to_string());
            lines.push(turn.parsed.clone());
            lines.push("```".to_string());
            lines.push(String::new());
        }
        lines.join("\n")
    }
}
