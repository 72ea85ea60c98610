//! Prompt templates keyed by intent.
//!
//! Each template is a fixed message skeleton with `{name}` placeholders,
//! filled in per request before the model call.

use crate::error::RouteError;
use crate::types::{ChatMessage, ChatRole};
use std::collections::HashMap;

/// A static prompt skeleton.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSpec {
    pub key: &'static str,
    pub messages: &'static [(ChatRole, &'static str)],
}

pub const DEFINE: TemplateSpec = TemplateSpec {
    key: "define",
    messages: &[
        (ChatRole::System, "Define the term in **one** sentence."),
        (ChatRole::User, "{term}"),
    ],
};

pub const SUMMARIZE: TemplateSpec = TemplateSpec {
    key: "summarize",
    messages: &[
        (ChatRole::System, "Summarize the text in ≤{max_words} words."),
        (ChatRole::User, "{text}"),
    ],
};

pub const RECIPE: TemplateSpec = TemplateSpec {
    key: "recipe",
    messages: &[
        (
            ChatRole::System,
            "Return a markdown recipe (title, ingredients, numbered steps, tips). Serve {servings} people.",
        ),
        (ChatRole::User, "{dish}"),
    ],
};

pub const DEFAULT: TemplateSpec = TemplateSpec {
    key: "default",
    messages: &[
        (ChatRole::System, "You are a helpful assistant."),
        (ChatRole::User, "{question}"),
    ],
};

/// All templates, in registration order.
pub const TEMPLATES: &[TemplateSpec] = &[DEFINE, SUMMARIZE, RECIPE, DEFAULT];

/// Look up a template by key.
pub fn get(key: &str) -> Result<&'static TemplateSpec, RouteError> {
    TEMPLATES
        .iter()
        .find(|t| t.key == key)
        .ok_or_else(|| RouteError::UnknownTemplate(key.to_string()))
}

impl TemplateSpec {
    /// Name of the synthetic invocation node for this template.
    pub fn node_name(&self) -> String {
        format!("{}_template", self.key)
    }

    /// Fill every placeholder from `vars`.
    ///
    /// A placeholder without a value is an error; extra variables are ignored.
    pub fn render(&self, vars: &HashMap<&str, String>) -> Result<Vec<ChatMessage>, RouteError> {
        self.messages
            .iter()
            .map(|(role, text)| {
                substitute(text, vars)
                    .map(|content| ChatMessage::new(*role, content))
                    .map_err(|var| RouteError::MissingTemplateVar {
                        template: self.key.to_string(),
                        var,
                    })
            })
            .collect()
    }
}

/// Replace `{name}` occurrences; returns the first missing name on failure.
fn substitute(text: &str, vars: &HashMap<&str, String>) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                let value = vars.get(name).ok_or_else(|| name.to_string())?;
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}
