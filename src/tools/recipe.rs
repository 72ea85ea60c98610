//! Recipe generation through the `recipe` template.

use super::traits::{str_arg, uint_arg, ParamKind, ParamSpec, Tool, ToolSpec};
use crate::inference::{self, ModelClient};
use crate::templates;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub const NAME: &str = "recipe_tool";

pub const DEFAULT_SERVINGS: u64 = 2;

pub struct RecipeTool {
    spec: ToolSpec,
    model: Arc<dyn ModelClient>,
    default_servings: u64,
}

impl RecipeTool {
    pub fn new(model: Arc<dyn ModelClient>, default_servings: u64) -> Self {
        Self {
            spec: ToolSpec {
                name: NAME.into(),
                description: "Finds or generates a recipe for a given dish, optionally for a specified number of servings. Use for recipe requests.".into(),
                params: vec![
                    ParamSpec::required("dish", ParamKind::String, "Dish to cook"),
                    ParamSpec::optional(
                        "servings",
                        ParamKind::Integer,
                        "Number of people to serve",
                        json!(default_servings),
                    ),
                ],
            },
            model,
            default_servings,
        }
    }
}

#[async_trait]
impl Tool for RecipeTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let dish = str_arg(args, "dish")?;
        let servings = uint_arg(args, "servings", self.default_servings);
        let vars = HashMap::from([
            ("dish", dish.to_string()),
            ("servings", servings.to_string()),
        ]);
        let messages = templates::RECIPE.render(&vars)?;
        inference::complete(self.model.as_ref(), &messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedModel;

    #[tokio::test]
    async fn servings_fall_back_to_default() {
        let model = Arc::new(ScriptedModel::new("claude", vec![]));
        let tool = RecipeTool::new(model.clone(), DEFAULT_SERVINGS);

        tool.execute(&json!({"dish": "ramen", "servings": "a crowd"}))
            .await
            .unwrap();

        let calls = model.calls.lock().unwrap();
        assert!(calls[0].0[0].content.ends_with("Serve 2 people."));
        assert_eq!(calls[0].0[1].content, "ramen");
    }
}
