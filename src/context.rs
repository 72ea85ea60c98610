//! Application context: everything built once at startup and shared
//! read-only by every request.

use crate::config::{self, AskrouteConfig, Secrets};
use crate::error::RouteError;
use crate::inference::{AnthropicClient, ModelClient, OpenAiClient};
use crate::router::{ChainExecutor, ModelRouter, RouteArgs};
use crate::tools::{self, ToolRegistry};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

struct ModelEntry {
    display_name: String,
    client: Arc<dyn ModelClient>,
}

/// Named model providers in registration order.
#[derive(Default)]
pub struct ModelSet {
    models: IndexMap<String, ModelEntry>,
}

impl ModelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider under `key` (e.g. "deepseek") with a display name.
    pub fn with(mut self, key: &str, display_name: &str, client: Arc<dyn ModelClient>) -> Self {
        self.models.insert(
            key.to_string(),
            ModelEntry {
                display_name: display_name.to_string(),
                client,
            },
        );
        self
    }

    pub fn get(&self, key: &str) -> Result<Arc<dyn ModelClient>, RouteError> {
        self.models
            .get(key)
            .map(|m| m.client.clone())
            .ok_or_else(|| RouteError::UnknownModel(key.to_string()))
    }

    /// `(display name, client)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn ModelClient>)> {
        self.models
            .values()
            .map(|m| (m.display_name.as_str(), &m.client))
    }
}

/// Process-wide state handed to the chat service.
pub struct AppContext {
    pub config: AskrouteConfig,
    pub models: ModelSet,
    pub tools: Arc<ToolRegistry>,
}

impl AppContext {
    /// Assemble from explicit parts.
    pub fn new(config: AskrouteConfig, models: ModelSet, tools: ToolRegistry) -> Self {
        Self {
            config,
            models,
            tools: Arc::new(tools),
        }
    }

    /// Build HTTP client, providers and tool registry from configuration.
    pub fn from_config(config: AskrouteConfig, secrets: &Secrets) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        let models = ModelSet::new()
            .with(
                "deepseek",
                "DeepSeek",
                Arc::new(OpenAiClient::new(
                    http.clone(),
                    "deepseek",
                    config::DEEPSEEK_KEY_VAR,
                    secrets.deepseek_api_key.clone(),
                    config.deepseek.clone(),
                )),
            )
            .with(
                "claude",
                "Claude",
                Arc::new(AnthropicClient::new(
                    http.clone(),
                    "claude",
                    config::ANTHROPIC_KEY_VAR,
                    secrets.anthropic_api_key.clone(),
                    config.claude.clone(),
                )),
            );

        let tools = tools::register_all(&config, secrets, &http, &models);
        info!("Context ready: {:?}", secrets);

        Ok(Self::new(config, models, tools))
    }

    /// Default step arguments taken from configuration.
    pub fn default_args(&self) -> RouteArgs {
        RouteArgs {
            top_n: Some(self.config.search.top_n),
            max_words: Some(self.config.summarizer.max_words),
            servings: Some(self.config.recipe.servings),
        }
    }

    /// Chain executor bound to the named model.
    pub fn executor(&self, model: &str) -> Result<ChainExecutor, RouteError> {
        Ok(ChainExecutor::new(self.tools.clone(), self.models.get(model)?))
    }

    /// Model-delegated router bound to the named model.
    pub fn model_router(&self, model: &str) -> Result<ModelRouter, RouteError> {
        Ok(ModelRouter::new(
            self.models.get(model)?,
            self.executor(model)?,
            self.config.agent.max_steps,
        ))
    }
}
