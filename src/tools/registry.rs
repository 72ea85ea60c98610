//! Name → tool mapping, built once at startup and read-only afterwards.
//!
//! Tools are registered explicitly. Names must carry the `_tool` suffix;
//! a tool that breaks the convention is rejected with a warning rather than
//! dropped silently.

use super::traits::{Tool, ToolDefinition, ToolSpec};
use crate::error::RouteError;
use crate::types::ToolResult;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Suffix every registered tool name must end with.
pub const TOOL_SUFFIX: &str = "_tool";

/// Read-only registry of invocable tools, in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
    skipped: Vec<String>,
}

/// Accumulates tools and tool sources before freezing them into a registry.
#[derive(Default)]
pub struct RegistryBuilder {
    tools: IndexMap<String, Arc<dyn Tool>>,
    skipped: Vec<String>,
}

impl RegistryBuilder {
    /// Add one tool, rejecting bad or duplicate names.
    pub fn try_register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RouteError> {
        let name = tool.spec().name.clone();
        if !name.ends_with(TOOL_SUFFIX) {
            return Err(RouteError::InvalidToolName(name));
        }
        if self.tools.contains_key(&name) {
            warn!("Tool '{}' registered twice; keeping the first", name);
            return Ok(());
        }
        debug!("Registered tool: {}", name);
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Add one tool; a rejected tool is logged and skipped.
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        if let Err(e) = self.try_register(tool) {
            warn!("Skipping tool: {}", e);
            self.skipped.push(e.to_string());
        }
        self
    }

    /// Add the tools produced by a fallible source.
    ///
    /// A failing source is logged and skipped; it never affects other sources.
    pub fn source<F>(mut self, label: &str, build: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<Vec<Arc<dyn Tool>>>,
    {
        match build() {
            Ok(tools) => {
                for tool in tools {
                    self = self.register(tool);
                }
            }
            Err(e) => {
                warn!("Tool source '{}' failed: {:#}", label, e);
                self.skipped.push(format!("{}: {:#}", label, e));
            }
        }
        self
    }

    /// Freeze into a registry.
    pub fn build(self) -> ToolRegistry {
        info!(
            "Tool registry ready: {} tools ({} skipped)",
            self.tools.len(),
            self.skipped.len()
        );
        ToolRegistry {
            tools: self.tools,
            skipped: self.skipped,
        }
    }
}

impl ToolRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn specs(&self) -> impl Iterator<Item = &ToolSpec> {
        self.tools.values().map(|t| t.spec())
    }

    /// Definitions for binding every tool to a model call.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.specs().map(ToolSpec::definition).collect()
    }

    /// Sources and tools that were rejected while building.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name. Never fails: errors come back as result text.
    pub async fn invoke(&self, name: &str, args: &Value) -> ToolResult {
        let Some(tool) = self.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return ToolResult {
                output: RouteError::UnknownTool(name.to_string()).to_string(),
                success: false,
            };
        };

        match tool.execute(args).await {
            Ok(output) => ToolResult {
                output,
                success: true,
            },
            Err(e) => ToolResult {
                output: format!("Error during {}: {:#}", name, e),
                success: false,
            },
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field("skipped", &self.skipped)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::traits::{ParamKind, ParamSpec};
    use anyhow::bail;
    use async_trait::async_trait;
    use serde_json::json;

    struct Echo {
        spec: ToolSpec,
        fail: bool,
    }

    impl Echo {
        fn named(name: &str) -> Arc<dyn Tool> {
            Arc::new(Self {
                spec: ToolSpec {
                    name: name.into(),
                    description: "echo".into(),
                    params: vec![ParamSpec::required("text", ParamKind::String, "text")],
                },
                fail: false,
            })
        }

        fn failing(name: &str) -> Arc<dyn Tool> {
            Arc::new(Self {
                spec: ToolSpec {
                    name: name.into(),
                    description: "always fails".into(),
                    params: vec![],
                },
                fail: true,
            })
        }
    }

    #[async_trait]
    impl Tool for Echo {
        fn spec(&self) -> &ToolSpec {
            &self.spec
        }

        async fn execute(&self, args: &Value) -> anyhow::Result<String> {
            if self.fail {
                bail!("upstream timed out");
            }
            Ok(args["text"].as_str().unwrap_or_default().to_string())
        }
    }

    #[test]
    fn misnamed_tool_is_rejected_not_registered() {
        let registry = ToolRegistry::builder()
            .register(Echo::named("echo_tool"))
            .register(Echo::named("echo"))
            .build();

        assert!(registry.contains("echo_tool"));
        assert!(!registry.contains("echo"));
        assert_eq!(registry.skipped(), ["Tool name 'echo' must end with '_tool'"]);
    }

    #[test]
    fn failing_source_does_not_abort_others() {
        let registry = ToolRegistry::builder()
            .source("broken", || bail!("no client"))
            .source("good", || Ok(vec![Echo::named("a_tool"), Echo::named("b_tool")]))
            .build();

        assert_eq!(registry.names().collect::<Vec<_>>(), ["a_tool", "b_tool"]);
        assert_eq!(registry.skipped(), ["broken: no client"]);
    }

    #[test]
    fn duplicate_name_keeps_first() {
        let registry = ToolRegistry::builder()
            .register(Echo::named("a_tool"))
            .register(Echo::failing("a_tool"))
            .build();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a_tool").unwrap().spec().description, "echo");
    }

    #[tokio::test]
    async fn invoke_reports_unknown_and_failed_tools_as_text() {
        let registry = ToolRegistry::builder()
            .register(Echo::named("echo_tool"))
            .register(Echo::failing("flaky_tool"))
            .build();

        let ok = registry.invoke("echo_tool", &json!({"text": "hi"})).await;
        assert!(ok.success);
        assert_eq!(ok.output, "hi");

        let missing = registry.invoke("nope_tool", &json!({})).await;
        assert!(!missing.success);
        assert_eq!(missing.output, "Unknown tool: nope_tool");

        let failed = registry.invoke("flaky_tool", &json!({})).await;
        assert!(!failed.success);
        assert_eq!(failed.output, "Error during flaky_tool: upstream timed out");
    }
}
