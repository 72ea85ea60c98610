pub mod define;
pub mod model_query;
pub mod recipe;
pub mod registry;
pub mod summarizer;
pub mod traits;
pub mod weather;
pub mod web_search;

pub use registry::{RegistryBuilder, ToolRegistry};
pub use traits::{ParamKind, ParamSpec, Tool, ToolDefinition, ToolSpec};

use crate::config::{AskrouteConfig, Secrets};
use crate::context::ModelSet;
use std::sync::Arc;

/// Build the registry from every built-in tool source.
///
/// Each source is isolated: one that cannot be constructed is logged and
/// skipped while the rest still register.
pub fn register_all(
    config: &AskrouteConfig,
    secrets: &Secrets,
    http: &reqwest::Client,
    models: &ModelSet,
) -> ToolRegistry {
    ToolRegistry::builder()
        .source("summarizer", || {
            Ok(vec![Arc::new(summarizer::SummarizeTool::new(
                config.summarizer.max_words,
            )) as Arc<dyn Tool>])
        })
        .source("web_search", || {
            Ok(vec![Arc::new(web_search::WebSearchTool::new(
                http.clone(),
                &config.search.base_url,
                secrets.tavily_api_key.clone(),
                config.search.top_n,
            )) as Arc<dyn Tool>])
        })
        .source("weather", || {
            Ok(vec![Arc::new(weather::WeatherTool::new(
                http.clone(),
                config.weather.clone(),
            )) as Arc<dyn Tool>])
        })
        .source("template_tools", || {
            let model = models.get(&config.tool_model)?;
            Ok(vec![
                Arc::new(define::DefineTool::new(model.clone())) as Arc<dyn Tool>,
                Arc::new(recipe::RecipeTool::new(model, config.recipe.servings)),
            ])
        })
        .source("model_tools", || {
            Ok(models
                .iter()
                .map(|(label, model)| {
                    Arc::new(model_query::ModelQueryTool::new(model.clone(), label))
                        as Arc<dyn Tool>
                })
                .collect())
        })
        .build()
}
