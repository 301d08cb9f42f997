//! `dvla onboard`: write the default configuration.
//!
//! Creates `~/.dvla/config.json` when it is absent and the REPL history
//! directory. An existing config is never overwritten.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use dvla_core::config::{get_config_path, save_config, Config};
use dvla_core::utils::get_data_path;

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "DVLA Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if write_default_config(&config_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    let history_dir = get_data_path().join("history");
    std::fs::create_dir_all(&history_dir)
        .with_context(|| format!("failed to create {}", history_dir.display()))?;

    println!();
    println!(
        "{}",
        "  Setup complete! Add your API key to the config, then run `dvla chat`.".green()
    );
    println!();
    Ok(())
}

/// Write the default config to `path` unless a file is already there.
/// Returns whether a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dvla_core::config::load_config;

    #[test]
    fn writes_defaults_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        assert!(write_default_config(&path).unwrap());
        let config = load_config(Some(&path));
        assert_eq!(config.agent.max_iterations, 6);
        assert_eq!(config.bank.current_user_id, "1");
    }

    #[test]
    fn keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"agent": {"model": "custom"}}"#).unwrap();

        assert!(!write_default_config(&path).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"agent": {"model": "custom"}}"#
        );
    }
}
