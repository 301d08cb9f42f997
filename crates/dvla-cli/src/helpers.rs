//! Shared CLI helpers: agent wiring, response printing, banner.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{debug, warn};

use dvla_agent::tools::{bank_registry, BankSource};
use dvla_agent::AgentLoop;
use dvla_core::config::Config;
use dvla_core::store::ConversationStore;
use dvla_core::utils::expand_home;
use dvla_providers::HttpProvider;

/// Build the agent from the loaded configuration: HTTP provider, bank tools,
/// and an empty conversation store.
pub fn build_agent(config: &Config) -> Result<Arc<AgentLoop>> {
    if !config.provider.is_configured() {
        warn!("no API key configured; set DVLA_PROVIDER__API_KEY or run `dvla onboard`");
    }

    let provider = HttpProvider::new(&config.provider, &config.agent.model)
        .context("failed to create LLM provider")?;

    let bank = BankSource::from_path(bank_path(config));
    let tools = bank_registry(bank, &config.bank.current_user_id);
    debug!(tools = ?tools.tool_names(), "registered tools");

    let store = Arc::new(ConversationStore::new(
        config.agent.welcome_message.clone(),
    ));

    Ok(Arc::new(AgentLoop::new(
        Arc::new(provider),
        tools,
        store,
        &config.agent,
    )))
}

/// Load `KEY=value` pairs from a `.env` file into the process environment.
///
/// With no path, `.env` is searched from the working directory upwards.
/// Variables that are already set keep their value. Returns the file that
/// was loaded.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    let loaded = match path {
        Some(p) => dotenvy::from_path(p).map(|()| p.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    loaded.ok()
}

/// Resolved bank data file, if one is configured.
pub fn bank_path(config: &Config) -> Option<PathBuf> {
    config
        .bank
        .data_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(expand_home)
}

/// Print an assistant reply to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "Assistant".cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the banner shown at REPL start, followed by the welcome message.
pub fn print_banner(welcome: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "DVLA".cyan().bold(), version.dimmed());
    println!("{}", "Type a message, or \"exit\" to quit.".dimmed());
    print_response(welcome.trim_end());
}

/// Print a "thinking" placeholder.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}
