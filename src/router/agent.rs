//! Model-delegated routing: the model picks the tool.
//!
//! The model sees every registered tool definition. A reply without tool
//! calls is answered directly; otherwise the first proposed call runs, its
//! output is fed back, and the model is asked again until it answers in
//! text, repeats itself, or the step budget runs out.

use super::executor::{ChainExecutor, Execution};
use super::recorder::{InvocationRecorder, REPEAT_SUPPRESSED_MESSAGE};
use crate::inference::ModelClient;
use crate::templates;
use crate::types::*;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ModelRouter {
    model: Arc<dyn ModelClient>,
    executor: ChainExecutor,
    max_steps: usize,
}

impl ModelRouter {
    /// `max_steps` is at least 1, so a proposed call always gets to run once.
    pub fn new(model: Arc<dyn ModelClient>, executor: ChainExecutor, max_steps: usize) -> Self {
        Self {
            model,
            executor,
            max_steps: max_steps.max(1),
        }
    }

    fn opening(message: &str) -> Result<Vec<ChatMessage>> {
        let vars = HashMap::from([("question", message.trim().to_string())]);
        Ok(templates::DEFAULT.render(&vars)?)
    }

    /// One model round: a direct answer, or the first proposed tool call.
    pub async fn decide(&self, message: &str) -> Result<RouteDecision> {
        let definitions = self.executor.tools().definitions();
        let response = self
            .model
            .generate(&Self::opening(message)?, &definitions)
            .await?;
        Ok(decision_from(&response))
    }

    /// Run the bounded tool loop for `message`.
    pub async fn run(&self, message: &str) -> Execution {
        let mut recorder = InvocationRecorder::new();
        let (route, final_text) = self.run_loop(message, &mut recorder).await;
        Execution {
            route,
            final_text,
            entries: recorder.drain(),
        }
    }

    async fn run_loop(
        &self,
        message: &str,
        recorder: &mut InvocationRecorder,
    ) -> (RouteDecision, String) {
        let provider = self.model.provider().to_string();
        let definitions = self.executor.tools().definitions();
        let mut route = None;

        let mut messages = match Self::opening(message) {
            Ok(m) => m,
            Err(e) => return (direct(e.to_string()), e.to_string()),
        };

        let mut steps = 0;
        let final_text = loop {
            let response = match self.model.generate(&messages, &definitions).await {
                Ok(r) => r,
                Err(e) => {
                    let text = format!("Error during {}: {:#}", provider, e);
                    warn!("{}", text);
                    if let Some(input) = recorder.last_output().map(str::to_string) {
                        recorder.record(&provider, input, text.clone());
                    }
                    break text;
                }
            };

            if route.is_none() {
                route = Some(decision_from(&response));
            }

            let Some(call) = response.tool_calls.first().cloned() else {
                let content = response
                    .content
                    .unwrap_or_else(|| format!("{} returned no content", provider));
                if let Some(input) = recorder.last_output().map(str::to_string) {
                    recorder.record(&provider, input, content.clone());
                }
                break content;
            };

            if response.tool_calls.len() > 1 {
                debug!(
                    "Model proposed {} calls, honoring only {}",
                    response.tool_calls.len(),
                    call.name
                );
            }
            if recorder.is_repeat(&call.name, &call.arguments) {
                info!("Suppressed repeated call to {}", call.name);
                break REPEAT_SUPPRESSED_MESSAGE.to_string();
            }
            if steps >= self.max_steps {
                warn!("Step budget of {} exhausted", self.max_steps);
                break recorder.last_output().unwrap_or_default().to_string();
            }
            steps += 1;

            info!("Model step {}: {}({})", steps, call.name, call.arguments);
            let output = match self
                .executor
                .run_tool(&call.name, call.arguments.clone(), recorder)
                .await
            {
                Ok(output) => output,
                Err(halt) => break halt,
            };

            messages.push(ChatMessage::assistant_calls(
                response.content.unwrap_or_default(),
                vec![call.clone()],
            ));
            messages.push(ChatMessage::tool_result(call.id, output));
        };

        let route = route.unwrap_or_else(|| direct(final_text.clone()));
        (route, final_text)
    }
}

fn direct(content: String) -> RouteDecision {
    RouteDecision {
        intent: None,
        target: RouteTarget::Direct { content },
    }
}

/// Only the first proposed call is honored.
fn decision_from(response: &ModelResponse) -> RouteDecision {
    match response.tool_calls.first() {
        Some(call) => RouteDecision {
            intent: None,
            target: RouteTarget::SingleTool {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
        },
        None => direct(response.content.clone().unwrap_or_default()),
    }
}
