//! End-to-end routing through the chat service with in-memory providers.

mod common;

use askroute::render::build_mermaid;
use askroute::router::REPEAT_SUPPRESSED_MESSAGE;
use askroute::tools::Tool;
use askroute::types::RoutingPolicy;
use common::{answer, call, service, CannedModel, FakeSearch};
use serde_json::json;
use std::sync::Arc;

fn search() -> Arc<dyn Tool> {
    FakeSearch::new()
}

#[tokio::test]
async fn define_runs_one_template_step() {
    let model = CannedModel::new("deepseek", vec![answer("Entropy is a measure of disorder.")]);
    let turn = service(model.clone(), vec![])
        .chat("define entropy", RoutingPolicy::Lexical)
        .await
        .unwrap();

    assert_eq!(turn.entries.len(), 1);
    assert_eq!(turn.entries[0].name, "define_template");
    assert_eq!(turn.entries[0].input, "entropy");
    assert_eq!(turn.parsed, "Entropy is a measure of disorder.");

    let prompt = &model.seen.lock().unwrap()[0];
    assert_eq!(prompt[0].content, "Define the term in **one** sentence.");
    assert_eq!(prompt[1].content, "entropy");
}

#[tokio::test]
async fn tldr_of_long_passage_is_cut_to_limit() {
    let passage = (0..500).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
    let turn = service(CannedModel::new("deepseek", vec![]), vec![])
        .chat(&format!("tl;dr {}", passage), RoutingPolicy::Lexical)
        .await
        .unwrap();

    assert_eq!(turn.entries.len(), 1);
    assert_eq!(turn.entries[0].name, "summarize_tool");
    assert!(turn.parsed.split_whitespace().count() <= 150);
    assert!(turn.parsed.ends_with("..."));
    assert!(turn.parsed.starts_with("tl;dr w0 w1"));
    assert_eq!(turn.entries[0].input, format!("tl;dr {}", passage));
}

#[tokio::test]
async fn plain_question_searches_then_summarizes() {
    let svc = service(CannedModel::new("deepseek", vec![]), vec![search()]);
    let turn = svc
        .chat("What is the weather in Maryville, MO?", RoutingPolicy::Lexical)
        .await
        .unwrap();

    let names: Vec<&str> = turn.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["tavily_search_tool", "summarize_tool"]);
    assert_eq!(turn.entries[0].input, "What is the weather in Maryville, MO?");
    assert!(turn.entries[0].output.starts_with('{'));
    assert_eq!(turn.entries[1].input, turn.entries[0].output);
    assert_eq!(turn.parsed, turn.entries[1].output);
    assert!(turn.parsed.ends_with("..."));

    let diagram = build_mermaid(&turn.entries);
    assert!(diagram.contains("start --> tool0;\ntool0 --> tool1;\ntool1 --> end_node;"));
}

#[tokio::test]
async fn failed_search_ends_chain_with_its_error() {
    let svc = service(CannedModel::new("deepseek", vec![]), vec![FakeSearch::failing() as Arc<dyn Tool>]);
    let turn = svc.chat("latest news", RoutingPolicy::Lexical).await.unwrap();

    assert_eq!(turn.entries.len(), 1);
    assert_eq!(
        turn.parsed,
        "Error during tavily_search_tool: search backend timed out"
    );
}

#[tokio::test]
async fn missing_search_tool_reports_unknown_tool() {
    let turn = service(CannedModel::new("deepseek", vec![]), vec![])
        .chat("What is the weather in Maryville, MO?", RoutingPolicy::Lexical)
        .await
        .unwrap();

    assert!(turn.entries.is_empty());
    assert_eq!(turn.parsed, "Unknown tool: tavily_search_tool");
}

#[tokio::test]
async fn model_requested_tool_not_in_registry() {
    let model = CannedModel::new("deepseek", vec![call("stock_price_tool", json!({"symbol": "ACME"}))]);
    let turn = service(model, vec![])
        .chat("price of ACME?", RoutingPolicy::Model)
        .await
        .unwrap();

    assert!(turn.entries.is_empty());
    assert_eq!(turn.parsed, "Unknown tool: stock_price_tool");
}

#[tokio::test]
async fn repeated_identical_call_is_suppressed() {
    let repeated = call("tavily_search_tool", json!({"query": "rust 2024 edition"}));
    let model = CannedModel::new("deepseek", vec![repeated.clone(), repeated]);
    let turn = service(model, vec![search()])
        .chat("what changed in rust 2024?", RoutingPolicy::Model)
        .await
        .unwrap();

    assert_eq!(turn.entries.len(), 1);
    assert_eq!(turn.entries[0].name, "tavily_search_tool");
    assert_eq!(turn.parsed, REPEAT_SUPPRESSED_MESSAGE);
}

#[tokio::test]
async fn model_answer_after_tool_is_recorded_under_provider() {
    let model = CannedModel::new(
        "deepseek",
        vec![
            call("tavily_search_tool", json!({"query": "weather Maryville"})),
            answer("Sunny, around 72 degrees."),
        ],
    );
    let turn = service(model, vec![search()])
        .chat("weather in Maryville?", RoutingPolicy::Model)
        .await
        .unwrap();

    assert_eq!(turn.used_tools, ["tavily_search_tool", "deepseek"]);
    assert_eq!(turn.parsed, "Sunny, around 72 degrees.");
    assert_eq!(turn.entries.last().unwrap().output, turn.parsed);
}
