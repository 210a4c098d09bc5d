//! localagent CLI — entry point.
//!
//! - `localagent` — interactive REPL
//! - `localagent -m "..."` — answer one message and exit
//!
//! Setup problems (bad config, missing prompt file) end the process with a
//! non-zero status. Failed turns inside the REPL do not.

mod helpers;
mod repl;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use localagent_agent::{builtin_registry, Agent, Inventory, PromptTemplates, DEFAULT_PROMPTS_FILE};
use localagent_core::config::{load_config, Config};
use localagent_providers::{ChatModel, GenerationOptions, HttpChatModel};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🤖 localagent — a tool-calling agent for a local chat-completions endpoint
#[derive(Parser, Debug)]
#[command(name = "localagent", version, about, long_about = None)]
struct Cli {
    /// Prompt template file (YAML with a `system_prompt` key)
    #[arg(long, default_value = DEFAULT_PROMPTS_FILE)]
    prompts: String,

    /// Config file (defaults to ~/.localagent/config.json)
    #[arg(long)]
    config: Option<String>,

    /// Single message (non-interactive). Omit for REPL mode.
    #[arg(short, long)]
    message: Option<String>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    logs: bool,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    let config_path = cli.config.as_deref().map(helpers::expand_tilde);
    let config = load_config(config_path.as_deref()).context("failed to load configuration")?;

    let prompts_path = helpers::expand_tilde(&cli.prompts);
    let templates = PromptTemplates::load(&prompts_path)?;

    let agent = build_agent(&config, &templates)?;

    match cli.message {
        Some(message) => {
            info!("processing single message");
            let answer = agent.run(&message).await.context("agent run failed")?;
            println!("{}", helpers::format_answer(&answer));
        }
        None => {
            helpers::print_banner(&config.agent.name, &config.model.model);
            repl::run(&agent).await?;
        }
    }

    Ok(())
}

/// Wire the chat model, tools, and system prompt into an `Agent`.
fn build_agent(config: &Config, templates: &PromptTemplates) -> Result<Agent> {
    let model = HttpChatModel::new(&config.model).context("failed to create chat model client")?;
    let registry = builtin_registry(Inventory::starter(), &config.tools.web_search)
        .context("failed to register built-in tools")?;

    let max_steps = config.agent.max_steps as usize;
    let system_prompt = templates.render_system_prompt(&registry.describe(), max_steps);

    info!(
        agent = %config.agent.name,
        model = %model.model_id(),
        api_base = %config.model.api_base,
        tools = registry.len(),
        max_steps,
        "agent ready"
    );

    Ok(Agent::new(Arc::new(model), registry, system_prompt)
        .with_options(GenerationOptions::from(&config.model))
        .with_max_steps(max_steps))
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("localagent=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
