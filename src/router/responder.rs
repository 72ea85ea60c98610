//! Responder: turns a classified message into its answer text.

use super::classifier;
use super::executor::{ChainExecutor, RouteArgs};
use crate::types::{Intent, InvocationEntry, RouteDecision};
use tracing::info;

/// Answer text plus the steps that produced it.
#[derive(Debug, Clone)]
pub struct Response {
    pub route: RouteDecision,
    pub text: String,
    pub entries: Vec<InvocationEntry>,
}

/// Lexical-policy front end over the chain executor.
pub struct Responder {
    executor: ChainExecutor,
    defaults: RouteArgs,
}

impl Responder {
    pub fn new(executor: ChainExecutor, defaults: RouteArgs) -> Self {
        Self { executor, defaults }
    }

    /// Answer text for `message` under `intent`.
    pub async fn respond(&self, intent: Intent, message: &str, args: &RouteArgs) -> String {
        self.respond_recorded(intent, message, args).await.text
    }

    /// Like [`respond`](Self::respond), keeping the recorded steps.
    pub async fn respond_recorded(
        &self,
        intent: Intent,
        message: &str,
        args: &RouteArgs,
    ) -> Response {
        let args = args.or(self.defaults);
        let execution = self.executor.execute(intent, message, &args).await;
        Response {
            route: execution.route,
            text: execution.final_text,
            entries: execution.entries,
        }
    }

    /// Classify, then respond.
    pub async fn respond_to(&self, message: &str, args: &RouteArgs) -> Response {
        let intent = classifier::classify(message);
        info!("Classified as {}", intent);
        self.respond_recorded(intent, message, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{text, EchoTool, ScriptedModel};
    use crate::tools::summarizer::SummarizeTool;
    use crate::tools::ToolRegistry;
    use std::sync::Arc;

    fn responder(defaults: RouteArgs) -> Responder {
        let tools = ToolRegistry::builder()
            .register(Arc::new(SummarizeTool::default()))
            .register(EchoTool::arc("tavily_search_tool"))
            .build();
        let model = ScriptedModel::arc("claude", vec![text("Disorder, measured.")]);
        Responder::new(ChainExecutor::new(Arc::new(tools), model), defaults)
    }

    #[tokio::test]
    async fn respond_returns_last_step_output() {
        let r = responder(RouteArgs::default());
        let answer = r
            .respond(Intent::Define, "define entropy", &RouteArgs::default())
            .await;
        assert_eq!(answer, "Disorder, measured.");
    }

    #[tokio::test]
    async fn configured_defaults_apply_when_args_are_unset() {
        let r = responder(RouteArgs {
            max_words: Some(2),
            ..Default::default()
        });
        let out = r.respond_to("tl;dr one two three four", &RouteArgs::default()).await;
        assert_eq!(out.text, "tl;dr one...");

        let out = r
            .respond_to(
                "tl;dr one two three four",
                &RouteArgs {
                    max_words: Some(3),
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(out.text, "tl;dr one two...");
    }

    #[tokio::test]
    async fn short_summarize_request_comes_back_verbatim() {
        let r = responder(RouteArgs::default());
        let out = r.respond_to("  tl;dr short text ", &RouteArgs::default()).await;
        assert_eq!(out.text, "tl;dr short text");
        assert_eq!(out.entries[0].input, "tl;dr short text");
    }

    #[tokio::test]
    async fn respond_to_classifies_first() {
        let r = responder(RouteArgs::default());
        let out = r.respond_to("What is the weather in Maryville, MO?", &RouteArgs::default()).await;
        assert_eq!(out.route.intent, Some(Intent::Default));
        let names: Vec<&str> = out.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["tavily_search_tool", "summarize_tool"]);
    }
}
