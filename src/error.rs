//! Routing error taxonomy.
//!
//! The `Display` strings double as the user-visible diagnostics: the core
//! returns them as answer text instead of propagating them.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Template '{template}' is missing variable '{var}'")]
    MissingTemplateVar { template: String, var: String },

    #[error("Tool name '{0}' must end with '_tool'")]
    InvalidToolName(String),

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Unknown model: {0}")]
    UnknownModel(String),
}
