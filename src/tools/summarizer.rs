//! Word-limit summarizer.
//!
//! Truncation is by whitespace-separated words, never by characters, and the
//! input is treated as opaque text (JSON search results are only word-split).

use super::traits::{str_arg, uint_arg, ParamKind, ParamSpec, Tool, ToolSpec};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

pub const NAME: &str = "summarize_tool";

/// Default word budget.
pub const DEFAULT_MAX_WORDS: u64 = 150;

/// Marker appended when text was cut.
pub const ELLIPSIS: &str = "...";

/// Return `text` unchanged if it fits in `max_words`, otherwise its first
/// `max_words` words joined by single spaces followed by `...`.
pub fn summarize(text: &str, max_words: usize) -> String {
    let mut words = text.split_whitespace();
    let head: Vec<&str> = words.by_ref().take(max_words).collect();

    if words.next().is_none() {
        return text.to_string();
    }

    let mut out = head.join(" ");
    out.push_str(ELLIPSIS);
    out
}

pub struct SummarizeTool {
    spec: ToolSpec,
    default_max_words: u64,
}

impl SummarizeTool {
    pub fn new(default_max_words: u64) -> Self {
        Self {
            spec: ToolSpec {
                name: NAME.into(),
                description: "Summarize the input text to at most max_words words.".into(),
                params: vec![
                    ParamSpec::required("text", ParamKind::String, "Text to summarize"),
                    ParamSpec::optional(
                        "max_words",
                        ParamKind::Integer,
                        "Maximum number of words to keep",
                        json!(default_max_words),
                    ),
                ],
            },
            default_max_words,
        }
    }
}

impl Default for SummarizeTool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORDS)
    }
}

#[async_trait]
impl Tool for SummarizeTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: &Value) -> Result<String> {
        let text = str_arg(args, "text")?;
        let max_words = uint_arg(args, "max_words", self.default_max_words);
        Ok(summarize(text, max_words as usize))
    }
}
