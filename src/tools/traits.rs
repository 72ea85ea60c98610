//! Tool trait and the parameter metadata it exposes.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Definition of a tool exposed to the inference model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
}

/// One parameter in a tool's signature.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    /// `None` marks the parameter as required.
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            default: None,
        }
    }

    pub fn optional(
        name: &'static str,
        kind: ParamKind,
        description: &'static str,
        default: Value,
    ) -> Self {
        Self {
            name,
            kind,
            description,
            default: Some(default),
        }
    }
}

/// Immutable description of a registered tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    /// JSON Schema object for the parameters, in declaration order.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for p in &self.params {
            let mut prop = json!({
                "type": p.kind,
                "description": p.description,
            });
            match &p.default {
                Some(default) => {
                    prop["default"] = default.clone();
                }
                None => required.push(Value::from(p.name)),
            }
            properties.insert(p.name.to_string(), prop);
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Definition handed to model providers for tool binding.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters_schema(),
        }
    }

    /// The first required string parameter, used when a tool is handed bare text.
    pub fn primary_param(&self) -> Option<&'static str> {
        self.params
            .iter()
            .find(|p| p.default.is_none() && p.kind == ParamKind::String)
            .map(|p| p.name)
    }
}

/// A capability the router can invoke by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and parameter schema.
    fn spec(&self) -> &ToolSpec;

    /// Execute the tool with the given arguments.
    ///
    /// Errors are turned into result text by the registry; implementations
    /// should not swallow them.
    async fn execute(&self, args: &Value) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// Required string argument.
pub fn str_arg<'a>(args: &'a Value, name: &str) -> Result<&'a str> {
    args[name]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' argument", name))
}

/// Optional positive integer argument; numbers and numeric strings are
/// accepted, anything else falls back to `default`.
pub fn uint_arg(args: &Value, name: &str, default: u64) -> u64 {
    lenient_uint(&args[name]).unwrap_or(default)
}

/// Parse a JSON value as an unsigned integer, leniently.
pub fn lenient_uint(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
