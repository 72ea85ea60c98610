//! Mermaid diagrams and console output for conversation turns.

use crate::types::{ConversationTurn, InvocationEntry};
use colored::Colorize;

/// Longest input/output text kept in a diagram label, in characters.
pub const LABEL_BUDGET: usize = 80;

/// Flowchart of the recorded steps: `start`, one node per entry, `end_node`.
pub fn build_mermaid(entries: &[InvocationEntry]) -> String {
    let mut code = String::from("graph LR;\nstart((start));\nend_node((end));\n");

    let mut lines = Vec::with_capacity(entries.len() * 2 + 1);
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!(
            "tool{}[\"{}\\nIn: {}\\nOut: {}\"];",
            i,
            escape(&entry.name),
            label_text(&entry.input),
            label_text(&entry.output)
        ));
    }
    for i in 0..entries.len() {
        let from = if i == 0 {
            "start".to_string()
        } else {
            format!("tool{}", i - 1)
        };
        lines.push(format!("{} --> tool{};", from, i));
    }
    match entries.len() {
        0 => lines.push("start --> end_node;".to_string()),
        n => lines.push(format!("tool{} --> end_node;", n - 1)),
    }

    code.push_str(&lines.join("\n"));
    code
}

fn label_text(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let clipped = if flat.chars().count() > LABEL_BUDGET {
        let head: String = flat.chars().take(LABEL_BUDGET).collect();
        format!("{}...", head)
    } else {
        flat
    };
    escape(&clipped)
}

fn escape(text: &str) -> String {
    text.replace('"', "\\\"")
}

/// Print a turn's answer and its steps.
pub fn print_turn(turn: &ConversationTurn) {
    println!();
    println!("{}", turn.parsed);
    println!();
    println!(
        "{} {} {}",
        "route:".dimmed(),
        turn.raw.cyan(),
        format!("[{} / {}]", turn.model, turn.policy).dimmed()
    );
    for entry in &turn.entries {
        println!(
            "  {} {} {}",
            format!("#{}", entry.ordinal).dimmed(),
            entry.name.green().bold(),
            preview(&entry.input).dimmed()
        );
    }
}

/// Print the registered tools with their parameters.
pub fn print_tools<'a>(specs: impl Iterator<Item = &'a crate::tools::ToolSpec>, skipped: &[String]) {
    println!("{}", "=== Registered tools ===".bold());
    for spec in specs {
        let params: Vec<&str> = spec.params.iter().map(|p| p.name).collect();
        println!("  {}({})", spec.name.green().bold(), params.join(", "));
        println!("    {}", spec.description);
    }
    for reason in skipped {
        println!("  {} {}", "skipped:".yellow(), reason);
    }
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > 60 {
        format!("{}...", flat.chars().take(60).collect::<String>())
    } else {
        flat
    }
}
