//! `dvla status`: show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use dvla_core::config::{get_config_path, load_config};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "DVLA Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        found_marker(config_path.exists())
    );

    let agent = &config.agent;
    println!("  {:<18} {}", "Model:".bold(), agent.model);
    println!(
        "  {:<18} {} | max_tokens: {}",
        "Parameters:".bold(),
        format!("temp: {}", agent.temperature).dimmed(),
        format!("{}", agent.max_tokens).dimmed(),
    );
    println!("  {:<18} {}", "Max iterations:".bold(), agent.max_iterations);
    println!("  {:<18} {}", "Tool protocol:".bold(), agent.tool_protocol);

    println!();
    println!(
        "  {:<18} {}",
        "API base:".bold(),
        config.provider.api_base_or_default()
    );
    let key_status = if config.provider.is_configured() {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    };
    println!("  {:<18} {}", "API key:".bold(), key_status);

    println!();
    println!(
        "  {:<18} {}",
        "Current user:".bold(),
        config.bank.current_user_id
    );
    match crate::helpers::bank_path(&config) {
        Some(path) => println!(
            "  {:<18} {} {}",
            "Bank data:".bold(),
            path.display(),
            found_marker(path.exists())
        ),
        None => println!("  {:<18} {}", "Bank data:".bold(), "built-in seed".dimmed()),
    }

    println!();
    Ok(())
}

fn found_marker(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}
