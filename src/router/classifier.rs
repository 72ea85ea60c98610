//! Lexical intent classification.
//!
//! Checks run in a fixed priority order and the first match wins: the two
//! prefix rules always run before the `recipe` substring rule.

use crate::types::Intent;

const DEFINE_PREFIX: &str = "define";
const SUMMARIZE_PREFIXES: &[&str] = &["summarize", "tl;dr"];
const RECIPE_MARKER: &str = "recipe";

/// Pick the intent for a message. Never fails; anything unmatched is `Default`.
///
/// Callers must reject empty input before getting here.
pub fn classify(message: &str) -> Intent {
    let normalized = message.trim().to_lowercase();

    if normalized.starts_with(DEFINE_PREFIX) {
        Intent::Define
    } else if SUMMARIZE_PREFIXES
        .iter()
        .any(|p| normalized.starts_with(p))
    {
        Intent::Summarize
    } else if normalized.contains(RECIPE_MARKER) {
        Intent::Recipe
    } else {
        Intent::Default
    }
}

/// The message minus the token that selected `intent`, trimmed.
///
/// `define` is stripped from the front and the first `recipe` occurrence is
/// removed wherever it sits. Matching ignores case. Summarize and default
/// messages pass through whole: the summarizer works on exactly the text
/// that was submitted.
pub fn strip_trigger(intent: Intent, message: &str) -> String {
    let trimmed = message.trim();
    let lower = trimmed.to_lowercase();

    let stripped = match intent {
        Intent::Define => strip_prefix_ci(trimmed, &lower, DEFINE_PREFIX),
        Intent::Recipe => match find_ci(trimmed, RECIPE_MARKER) {
            Some(at) => format!("{}{}", &trimmed[..at], &trimmed[at + RECIPE_MARKER.len()..]),
            None => trimmed.to_string(),
        },
        Intent::Summarize | Intent::Default => return trimmed.to_string(),
    };

    stripped.trim().trim_start_matches(':').trim().to_string()
}

fn strip_prefix_ci(original: &str, lower: &str, prefix: &str) -> String {
    // Lowercasing can change byte lengths outside ASCII; only slice when
    // the prefix maps to the same bytes in the original.
    match original.get(..prefix.len()) {
        Some(head) if lower.starts_with(prefix) && head.eq_ignore_ascii_case(prefix) => {
            original[prefix.len()..].to_string()
        }
        _ => original.to_string(),
    }
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let n = needle.len();
    haystack
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| {
            haystack
                .get(i..i + n)
                .is_some_and(|window| window.eq_ignore_ascii_case(needle))
        })
}
