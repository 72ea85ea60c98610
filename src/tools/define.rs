//! Definition of a term through the `define` template.

use super::traits::{str_arg, ParamKind, ParamSpec, Tool, ToolSpec};
use crate::inference::{self, ModelClient};
use crate::templates;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub const NAME: &str = "define_tool";

pub struct DefineTool {
    spec: ToolSpec,
    model: Arc<dyn ModelClient>,
}

impl DefineTool {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self {
            spec: ToolSpec {
                name: NAME.into(),
                description: "Defines a given term or concept. Use this when asked to define something (e.g., 'define X').".into(),
                params: vec![ParamSpec::required("term", ParamKind::String, "Term to define")],
            },
            model,
        }
    }
}

#[async_trait]
impl Tool for DefineTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let term = str_arg(args, "term")?;
        let vars = HashMap::from([("term", term.to_string())]);
        let messages = templates::DEFINE.render(&vars)?;
        inference::complete(self.model.as_ref(), &messages).await
    }
}
