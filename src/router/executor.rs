//! Chain executor: runs a route step by step and records each step.
//!
//! The lexical policy table lives in [`plan`]; everything else is generic
//! over step names. A step is either a registered tool or a
//! `<key>_template` node (template rendered, then a model call). Each step
//! consumes the previous step's output as its input text.

use super::classifier;
use super::recorder::InvocationRecorder;
use crate::error::RouteError;
use crate::inference::{self, ModelClient};
use crate::templates::{self, TemplateSpec};
use crate::tools::traits::lenient_uint;
use crate::tools::{recipe, summarizer, web_search, ToolRegistry};
use crate::types::*;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Optional numeric step arguments. Missing values fall back to the
/// built-in defaults when a step needs them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteArgs {
    pub top_n: Option<u64>,
    pub max_words: Option<u64>,
    pub servings: Option<u64>,
}

impl RouteArgs {
    /// Read from a JSON object, ignoring anything non-numeric.
    pub fn from_json(args: &Value) -> Self {
        Self {
            top_n: lenient_uint(&args["top_n"]),
            max_words: lenient_uint(&args["max_words"]),
            servings: lenient_uint(&args["servings"]),
        }
    }

    /// Fill unset values from `defaults`.
    pub fn or(self, defaults: RouteArgs) -> Self {
        Self {
            top_n: self.top_n.or(defaults.top_n),
            max_words: self.max_words.or(defaults.max_words),
            servings: self.servings.or(defaults.servings),
        }
    }

    pub fn top_n(&self) -> u64 {
        self.top_n.unwrap_or(web_search::DEFAULT_TOP_N)
    }

    pub fn max_words(&self) -> u64 {
        self.max_words.unwrap_or(summarizer::DEFAULT_MAX_WORDS)
    }

    pub fn servings(&self) -> u64 {
        self.servings.unwrap_or(recipe::DEFAULT_SERVINGS)
    }
}

/// Outcome of one request: the answer plus the steps that produced it.
#[derive(Debug, Clone)]
pub struct Execution {
    pub route: RouteDecision,
    pub final_text: String,
    pub entries: Vec<InvocationEntry>,
}

/// Text that ends a chain early (registry miss or failed step).
type Halt = String;

enum Step {
    Template(&'static TemplateSpec),
    Tool(String),
}

fn parse_step(name: &str) -> Step {
    name.strip_suffix("_template")
        .and_then(|key| templates::get(key).ok())
        .map(Step::Template)
        .unwrap_or_else(|| Step::Tool(name.to_string()))
}

/// Lexical policy table: which steps each intent runs.
pub fn plan(intent: Intent) -> RouteDecision {
    let steps: Vec<String> = match intent {
        Intent::Define => vec![templates::DEFINE.node_name()],
        Intent::Recipe => vec![templates::RECIPE.node_name()],
        Intent::Summarize => vec![summarizer::NAME.into()],
        Intent::Default => vec![web_search::NAME.into(), summarizer::NAME.into()],
    };
    RouteDecision {
        intent: Some(intent),
        target: RouteTarget::Chain { steps },
    }
}

/// Runs routes against a shared registry and one model provider.
#[derive(Clone)]
pub struct ChainExecutor {
    tools: Arc<ToolRegistry>,
    model: Arc<dyn ModelClient>,
}

impl ChainExecutor {
    pub fn new(tools: Arc<ToolRegistry>, model: Arc<dyn ModelClient>) -> Self {
        Self { tools, model }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn model(&self) -> &Arc<dyn ModelClient> {
        &self.model
    }

    /// Run the lexical policy for `intent`.
    pub async fn execute(&self, intent: Intent, message: &str, args: &RouteArgs) -> Execution {
        self.execute_route(plan(intent), message, args).await
    }

    /// Run an already-decided route with a fresh recorder.
    pub async fn execute_route(
        &self,
        route: RouteDecision,
        message: &str,
        args: &RouteArgs,
    ) -> Execution {
        let mut recorder = InvocationRecorder::new();
        let final_text = self.run_route(&route, message, args, &mut recorder).await;
        Execution {
            route,
            final_text,
            entries: recorder.drain(),
        }
    }

    /// Run a route, appending steps to `recorder`, and return the final text.
    pub async fn run_route(
        &self,
        route: &RouteDecision,
        message: &str,
        args: &RouteArgs,
        recorder: &mut InvocationRecorder,
    ) -> String {
        info!("Route: {}", describe(route));

        match &route.target {
            RouteTarget::Direct { content } => content.clone(),
            RouteTarget::SingleTool { name, arguments } => self
                .run_tool(name, arguments.clone(), recorder)
                .await
                .unwrap_or_else(|halt| halt),
            RouteTarget::Chain { steps } => {
                let input = match route.intent {
                    Some(intent) => classifier::strip_trigger(intent, message),
                    None => message.trim().to_string(),
                };
                self.run_chain(steps, input, args, recorder)
                    .await
                    .unwrap_or_else(|halt| halt)
            }
        }
    }

    async fn run_chain(
        &self,
        steps: &[String],
        input: String,
        args: &RouteArgs,
        recorder: &mut InvocationRecorder,
    ) -> Result<String, Halt> {
        let mut current = input;
        for name in steps {
            current = match parse_step(name) {
                Step::Template(template) => {
                    self.run_template(template, &current, args, recorder).await?
                }
                Step::Tool(tool) => {
                    let tool_args = self.tool_args(&tool, &current, args);
                    self.run_tool(&tool, tool_args, recorder).await?
                }
            };
        }
        Ok(current)
    }

    /// Invoke one tool and record it. Unknown tools halt without a record.
    pub async fn run_tool(
        &self,
        name: &str,
        args: Value,
        recorder: &mut InvocationRecorder,
    ) -> Result<String, Halt> {
        let Some(tool) = self.tools.get(name) else {
            warn!("Step skipped, tool not registered: {}", name);
            return Err(RouteError::UnknownTool(name.to_string()).to_string());
        };

        let input = match tool.spec().primary_param().and_then(|p| args[p].as_str()) {
            Some(text) => text.to_string(),
            None => args.to_string(),
        };

        debug!("Invoking {}", name);
        let result = self.tools.invoke(name, &args).await;
        recorder.record(name, input, result.output.clone());
        recorder.note_call(name, &args);

        if result.success {
            Ok(result.output)
        } else {
            warn!("Step {} failed: {}", name, result.output);
            Err(result.output)
        }
    }

    /// Render a template from the step input and ask the model.
    async fn run_template(
        &self,
        template: &TemplateSpec,
        input: &str,
        args: &RouteArgs,
        recorder: &mut InvocationRecorder,
    ) -> Result<String, Halt> {
        let node = template.node_name();
        let messages = template
            .render(&template_vars(template, input, args))
            .map_err(|e| e.to_string())?;

        debug!("Invoking {} via {}", node, self.model.provider());
        match inference::complete(self.model.as_ref(), &messages).await {
            Ok(text) => {
                recorder.record(&node, input, text.clone());
                Ok(text)
            }
            Err(e) => {
                let output = format!("Error during {}: {:#}", node, e);
                warn!("{}", output);
                recorder.record(&node, input, output.clone());
                Err(output)
            }
        }
    }

    /// Arguments for a tool step fed with `input`.
    fn tool_args(&self, name: &str, input: &str, args: &RouteArgs) -> Value {
        match name {
            web_search::NAME => json!({"query": input, "top_n": args.top_n()}),
            summarizer::NAME => json!({"text": input, "max_words": args.max_words()}),
            recipe::NAME => json!({"dish": input, "servings": args.servings()}),
            other => {
                let key = self
                    .tools
                    .get(other)
                    .and_then(|t| t.spec().primary_param())
                    .unwrap_or("query");
                let mut map = Map::new();
                map.insert(key.to_string(), Value::from(input));
                Value::Object(map)
            }
        }
    }
}

fn template_vars(template: &TemplateSpec, input: &str, args: &RouteArgs) -> HashMap<&'static str, String> {
    match template.key {
        "define" => HashMap::from([("term", input.to_string())]),
        "recipe" => HashMap::from([
            ("dish", input.to_string()),
            ("servings", args.servings().to_string()),
        ]),
        "summarize" => HashMap::from([
            ("text", input.to_string()),
            ("max_words", args.max_words().to_string()),
        ]),
        _ => HashMap::from([("question", input.to_string())]),
    }
}

/// One-line description of a route, used in logs and the turn's `raw` field.
pub fn describe(route: &RouteDecision) -> String {
    let intent = route.intent.map(|i| i.key()).unwrap_or("model");
    match &route.target {
        RouteTarget::Direct { .. } => format!("{}: direct answer", intent),
        RouteTarget::SingleTool { name, arguments } => {
            format!("{}: {}({})", intent, name, arguments)
        }
        RouteTarget::Chain { steps } => format!("{}: {}", intent, steps.join(" -> ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{text, EchoTool, ScriptedModel};
    use crate::tools::summarizer::SummarizeTool;
    use crate::tools::Tool;

    fn registry(extra: Vec<Arc<dyn Tool>>) -> Arc<ToolRegistry> {
        let mut builder = ToolRegistry::builder().register(Arc::new(SummarizeTool::default()));
        for tool in extra {
            builder = builder.register(tool);
        }
        Arc::new(builder.build())
    }

    #[test]
    fn policy_table() {
        let steps = |i| match plan(i).target {
            RouteTarget::Chain { steps } => steps,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(steps(Intent::Define), ["define_template"]);
        assert_eq!(steps(Intent::Recipe), ["recipe_template"]);
        assert_eq!(steps(Intent::Summarize), ["summarize_tool"]);
        assert_eq!(steps(Intent::Default), ["tavily_search_tool", "summarize_tool"]);
    }

    #[test]
    fn route_args_parse_leniently_and_merge() {
        let args = RouteArgs::from_json(&json!({"top_n": "five", "max_words": "20"}));
        assert_eq!(args.top_n, None);
        assert_eq!(args.max_words, Some(20));

        let merged = args.or(RouteArgs {
            top_n: Some(4),
            max_words: Some(99),
            servings: None,
        });
        assert_eq!((merged.top_n(), merged.max_words(), merged.servings()), (4, 20, 2));
    }

    #[tokio::test]
    async fn define_strips_token_and_records_template_node() {
        let model = Arc::new(ScriptedModel::new("claude", vec![text("A measure of disorder.")]));
        let exec = ChainExecutor::new(registry(vec![]), model.clone());

        let out = exec.execute(Intent::Define, "define entropy", &RouteArgs::default()).await;

        assert_eq!(out.final_text, "A measure of disorder.");
        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.entries[0].name, "define_template");
        assert_eq!(out.entries[0].input, "entropy");
        assert_eq!(model.calls.lock().unwrap()[0].0[1].content, "entropy");
    }

    #[tokio::test]
    async fn recipe_uses_servings_argument() {
        let model = Arc::new(ScriptedModel::new("claude", vec![]));
        let exec = ChainExecutor::new(registry(vec![]), model.clone());
        let args = RouteArgs {
            servings: Some(5),
            ..Default::default()
        };

        exec.execute(Intent::Recipe, "recipe for tacos", &args).await;

        let calls = model.calls.lock().unwrap();
        assert!(calls[0].0[0].content.ends_with("Serve 5 people."));
        assert_eq!(calls[0].0[1].content, "for tacos");
    }

    #[tokio::test]
    async fn default_chain_feeds_raw_search_output_to_summarizer() {
        let exec = ChainExecutor::new(
            registry(vec![EchoTool::arc("tavily_search_tool")]),
            ScriptedModel::arc("deepseek", vec![]),
        );
        let args = RouteArgs {
            max_words: Some(1),
            ..Default::default()
        };

        let out = exec.execute(Intent::Default, "weather in Paris", &args).await;

        assert_eq!(out.entries.len(), 2);
        assert_eq!(out.entries[0].name, "tavily_search_tool");
        assert_eq!(out.entries[0].input, "weather in Paris");
        assert_eq!(out.entries[1].name, "summarize_tool");
        assert_eq!(out.entries[1].input, out.entries[0].output);
        assert_eq!(out.final_text, out.entries[1].output);
        assert!(out.final_text.ends_with("..."));
    }

    #[tokio::test]
    async fn missing_search_tool_halts_chain_without_record() {
        let exec = ChainExecutor::new(registry(vec![]), ScriptedModel::arc("deepseek", vec![]));
        let out = exec.execute(Intent::Default, "anything", &RouteArgs::default()).await;

        assert!(out.entries.is_empty());
        assert_eq!(out.final_text, "Unknown tool: tavily_search_tool");
    }

    #[tokio::test]
    async fn failed_search_is_recorded_but_not_summarized() {
        let exec = ChainExecutor::new(
            registry(vec![EchoTool::failing("tavily_search_tool", "timeout")]),
            ScriptedModel::arc("deepseek", vec![]),
        );
        let out = exec.execute(Intent::Default, "anything", &RouteArgs::default()).await;

        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.final_text, "Error during tavily_search_tool: timeout");
        assert_eq!(out.entries[0].output, out.final_text);
    }

    #[tokio::test]
    async fn model_failure_in_template_becomes_answer_text() {
        let exec = ChainExecutor::new(
            registry(vec![]),
            Arc::new(ScriptedModel::failing("claude", "connection refused")),
        );
        let out = exec.execute(Intent::Define, "define x", &RouteArgs::default()).await;
        assert_eq!(out.final_text, "Error during define_template: connection refused");
        assert_eq!(out.entries.len(), 1);
    }

    #[tokio::test]
    async fn direct_route_runs_nothing() {
        let exec = ChainExecutor::new(registry(vec![]), ScriptedModel::arc("deepseek", vec![]));
        let route = RouteDecision {
            intent: None,
            target: RouteTarget::Direct {
                content: "Hello!".into(),
            },
        };
        let out = exec.execute_route(route, "hi", &RouteArgs::default()).await;
        assert_eq!(out.final_text, "Hello!");
        assert!(out.entries.is_empty());
    }

    #[tokio::test]
    async fn single_tool_route_passes_arguments_through() {
        let exec = ChainExecutor::new(registry(vec![]), ScriptedModel::arc("deepseek", vec![]));
        let route = RouteDecision {
            intent: None,
            target: RouteTarget::SingleTool {
                name: "summarize_tool".into(),
                arguments: json!({"text": "a b c", "max_words": 2}),
            },
        };
        let out = exec.execute_route(route, "ignored", &RouteArgs::default()).await;
        assert_eq!(out.final_text, "a b...");
        assert_eq!(out.entries[0].input, "a b c");
    }

    #[test]
    fn describe_routes() {
        assert_eq!(
            describe(&plan(Intent::Default)),
            "default: tavily_search_tool -> summarize_tool"
        );
    }
}
