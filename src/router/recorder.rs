//! Ordered trail of the steps that ran for one request.

use crate::types::InvocationEntry;
use serde_json::Value;

/// Fixed answer substituted when a tool loop re-proposes the call it just made.
pub const REPEAT_SUPPRESSED_MESSAGE: &str =
    "I already ran that tool with the same arguments, so I stopped instead of repeating the call. The result above is the answer.";

/// Request-scoped recorder. Entries keep execution order and are never
/// reordered or edited after being appended.
#[derive(Debug, Default)]
pub struct InvocationRecorder {
    entries: Vec<InvocationEntry>,
    last_call: Option<(String, Value)>,
}

impl InvocationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished step.
    pub fn record(&mut self, name: impl Into<String>, input: impl Into<String>, output: impl Into<String>) {
        let entry = InvocationEntry {
            ordinal: self.entries.len(),
            name: name.into(),
            input: input.into(),
            output: output.into(),
        };
        tracing::debug!("Recorded step #{}: {}", entry.ordinal, entry.name);
        self.entries.push(entry);
    }

    /// Remember the tool call that just executed, for repeat detection.
    pub fn note_call(&mut self, name: &str, args: &Value) {
        self.last_call = Some((name.to_string(), args.clone()));
    }

    /// The most recently executed tool call, if any.
    pub fn last_call(&self) -> Option<(&str, &Value)> {
        self.last_call.as_ref().map(|(n, a)| (n.as_str(), a))
    }

    /// True when `name` + `args` exactly match the immediately preceding call.
    pub fn is_repeat(&self, name: &str, args: &Value) -> bool {
        matches!(&self.last_call, Some((n, a)) if n == name && a == args)
    }

    pub fn entries(&self) -> &[InvocationEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Output of the most recent step.
    pub fn last_output(&self) -> Option<&str> {
        self.entries.last().map(|e| e.output.as_str())
    }

    /// Take the accumulated entries and start fresh.
    pub fn drain(&mut self) -> Vec<InvocationEntry> {
        self.last_call = None;
        std::mem::take(&mut self.entries)
    }
}
