//! Askroute: conversational tool router.
//!
//! Usage:
//!   askroute ask "define entropy"     Route one message and print the answer
//!   askroute chat                     Interactive session
//!   askroute tools                    List registered tools
//!   askroute init                     Write a default config file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use askroute::config::{self, AskrouteConfig, Secrets};
use askroute::context::AppContext;
use askroute::render;
use askroute::router::RouteArgs;
use askroute::session::{ChatService, SessionLog};
use askroute::types::RoutingPolicy;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "askroute")]
#[command(version = "0.1.0")]
#[command(about = "Route chat messages to tools and prompt templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (default: ~/.askroute/askroute.toml).
    #[arg(long)]
    config: Option<String>,

    /// Log level (debug, info, warn, error). Overrides the config file.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Route a single message and print the answer.
    Ask {
        /// The message to route.
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Model provider (deepseek, claude).
        #[arg(long)]
        model: Option<String>,

        /// Routing policy.
        #[arg(long, value_enum)]
        policy: Option<RoutingPolicy>,

        /// Number of search results to keep.
        #[arg(long)]
        top_n: Option<u64>,

        /// Word limit for summaries.
        #[arg(long)]
        max_words: Option<u64>,

        /// Servings for recipes.
        #[arg(long)]
        servings: Option<u64>,

        /// Also print the invocation graph as Mermaid.
        #[arg(long)]
        diagram: bool,
    },

    /// Start an interactive chat session.
    Chat {
        /// Model provider (deepseek, claude).
        #[arg(long)]
        model: Option<String>,

        /// Routing policy.
        #[arg(long, value_enum)]
        policy: Option<RoutingPolicy>,
    },

    /// List the registered tools.
    Tools,

    /// Write a default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config_path = cli
        .config
        .as_deref()
        .map(config::resolve_path)
        .unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Initialize logging
    let level = cli.log_level.clone().unwrap_or_else(|| cfg.log_level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init { force } => cmd_init(&config_path, force),
        Commands::Tools => cmd_tools(cfg),
        Commands::Ask {
            message,
            model,
            policy,
            top_n,
            max_words,
            servings,
            diagram,
        } => {
            let args = RouteArgs {
                top_n,
                max_words,
                servings,
            };
            cmd_ask(cfg, &message.join(" "), model, policy, args, diagram).await
        }
        Commands::Chat { model, policy } => cmd_chat(cfg, model, policy).await,
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        eprintln!(
            "{} Config already exists at {}. Use --force to overwrite.",
            "Error:".red().bold(),
            path.display()
        );
        std::process::exit(1);
    }
    config::save_config(&AskrouteConfig::default(), path)?;
    println!("{} Wrote {}", ">>>".green().bold(), path.display());
    Ok(())
}

fn cmd_tools(cfg: AskrouteConfig) -> Result<()> {
    let ctx = AppContext::from_config(cfg, &Secrets::from_env())?;
    render::print_tools(ctx.tools.specs(), ctx.tools.skipped());
    Ok(())
}

async fn cmd_ask(
    cfg: AskrouteConfig,
    message: &str,
    model: Option<String>,
    policy: Option<RoutingPolicy>,
    args: RouteArgs,
    diagram: bool,
) -> Result<()> {
    let policy = policy.unwrap_or(cfg.policy);
    let service = service(cfg, model)?;

    let turn = service.chat_with(message, policy, &args).await?;
    render::print_turn(&turn);
    if diagram {
        println!();
        println!("{}", render::build_mermaid(&turn.entries));
    }
    Ok(())
}

async fn cmd_chat(
    cfg: AskrouteConfig,
    model: Option<String>,
    policy: Option<RoutingPolicy>,
) -> Result<()> {
    let policy = policy.unwrap_or(cfg.policy);
    let service = service(cfg, model)?;
    let mut log = SessionLog::new();

    println!(
        "{} Chatting with {} ({} routing). Type 'exit' to quit.",
        ">>>".green().bold(),
        service.model(),
        policy,
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "exit" | "quit") {
            break;
        }

        match service.chat(message, policy).await {
            Ok(turn) => {
                render::print_turn(&turn);
                log.push(turn);
            }
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
        println!();
    }

    println!("\n{} Session ended", "<<<".red().bold());
    if !log.is_empty() {
        println!();
        println!("{}", log.to_markdown());
    }
    info!("Chat session closed after {} turns", log.turns().len());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the shared context and bind a chat service to the chosen model.
fn service(cfg: AskrouteConfig, model: Option<String>) -> Result<ChatService> {
    let model = model.unwrap_or_else(|| cfg.default_model.clone());
    let ctx = AppContext::from_config(cfg, &Secrets::from_env())?;
    Ok(ChatService::new(Arc::new(ctx), &model)?)
}
