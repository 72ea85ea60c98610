//! General-purpose tools that hand a query straight to one provider.

use super::traits::{str_arg, ParamKind, ParamSpec, Tool, ToolSpec};
use crate::inference::{self, ModelClient};
use crate::types::ChatMessage;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// `<provider>_tool`, e.g. `claude_tool`.
pub struct ModelQueryTool {
    spec: ToolSpec,
    model: Arc<dyn ModelClient>,
}

impl ModelQueryTool {
    pub fn new(model: Arc<dyn ModelClient>, display_name: &str) -> Self {
        Self {
            spec: ToolSpec {
                name: format!("{}_tool", model.provider()),
                description: format!(
                    "A general-purpose tool that uses the {} LLM to answer questions or generate text.",
                    display_name
                ),
                params: vec![ParamSpec::required("query", ParamKind::String, "Question or prompt")],
            },
            model,
        }
    }
}

#[async_trait]
impl Tool for ModelQueryTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let query = str_arg(args, "query")?;
        inference::complete(self.model.as_ref(), &[ChatMessage::user(query)]).await
    }
}
