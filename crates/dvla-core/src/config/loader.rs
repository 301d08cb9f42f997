//! Config loader: reads `~/.dvla/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.dvla/config.json`
//! 3. Environment variables `DVLA_<SECTION>__<FIELD>` (override JSON)
//!
//! `OPENAI_API_KEY` and `OPENAI_BASE_URL` fill the provider section only
//! when neither the file nor a `DVLA_` variable set it.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ToolProtocol};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path), |key| {
        std::env::var(key).ok()
    })
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// `lookup` resolves a variable name; tests pass a map instead of touching
/// the process environment.
///
/// Supported overrides:
/// - `DVLA_AGENT__MODEL` → `agent.model`
/// - `DVLA_AGENT__TEMPERATURE` → `agent.temperature`
/// - `DVLA_AGENT__MAX_TOKENS` → `agent.max_tokens`
/// - `DVLA_AGENT__MAX_ITERATIONS` → `agent.max_iterations`
/// - `DVLA_AGENT__TOOL_PROTOCOL` → `agent.tool_protocol`
/// - `DVLA_PROVIDER__API_KEY` → `provider.api_key`
/// - `DVLA_PROVIDER__API_BASE` → `provider.api_base`
/// - `DVLA_BANK__CURRENT_USER_ID` → `bank.current_user_id`
/// - `DVLA_BANK__DATA_PATH` → `bank.data_path`
fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    // Agent
    if let Some(val) = lookup("DVLA_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Some(val) = lookup("DVLA_AGENT__TEMPERATURE") {
        match val.parse::<f64>() {
            Ok(t) => config.agent.temperature = t,
            Err(_) => warn!(value = %val, "Ignoring invalid DVLA_AGENT__TEMPERATURE"),
        }
    }
    if let Some(val) = lookup("DVLA_AGENT__MAX_TOKENS") {
        match val.parse::<u32>() {
            Ok(n) => config.agent.max_tokens = n,
            Err(_) => warn!(value = %val, "Ignoring invalid DVLA_AGENT__MAX_TOKENS"),
        }
    }
    if let Some(val) = lookup("DVLA_AGENT__MAX_ITERATIONS") {
        match val.parse::<u32>() {
            Ok(n) => config.agent.max_iterations = n,
            Err(_) => warn!(value = %val, "Ignoring invalid DVLA_AGENT__MAX_ITERATIONS"),
        }
    }
    if let Some(val) = lookup("DVLA_AGENT__TOOL_PROTOCOL") {
        match val.parse::<ToolProtocol>() {
            Ok(p) => config.agent.tool_protocol = p,
            Err(e) => warn!("Ignoring DVLA_AGENT__TOOL_PROTOCOL: {}", e),
        }
    }

    // Provider
    if let Some(val) = lookup("DVLA_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    } else if config.provider.api_key.is_empty() {
        if let Some(val) = lookup("OPENAI_API_KEY") {
            config.provider.api_key = val;
        }
    }
    if let Some(val) = lookup("DVLA_PROVIDER__API_BASE") {
        config.provider.api_base = Some(val);
    } else if config.provider.api_base.is_none() {
        if let Some(val) = lookup("OPENAI_BASE_URL") {
            config.provider.api_base = Some(val);
        }
    }

    // Bank
    if let Some(val) = lookup("DVLA_BANK__CURRENT_USER_ID") {
        config.bank.current_user_id = val;
    }
    if let Some(val) = lookup("DVLA_BANK__DATA_PATH") {
        config.bank.data_path = Some(val);
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
