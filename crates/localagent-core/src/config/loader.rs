//! Config loader — reads `~/.localagent/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.localagent/config.json` (or an explicit path)
//! 3. `OPENAI_API_BASE` / `OPENAI_API_KEY`
//! 4. Environment variables `LOCALAGENT_<SECTION>__<FIELD>`
//!
//! A missing file is fine; an unreadable, malformed or out-of-range one is an
//! error.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use super::schema::Config;
use super::ConfigError;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default (or given) path + process env vars.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    load_config_with(&config_path, |key| std::env::var(key).ok())
}

/// Load config from `path`, resolving env vars through `env`.
pub fn load_config_with<F>(path: &Path, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = read_config_file(path)?;
    let config = apply_env_overrides(config, env)?;
    config.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `OPENAI_API_BASE` → `model.api_base`
/// - `OPENAI_API_KEY` → `model.api_key`
/// - `LOCALAGENT_MODEL__API_BASE` / `__API_KEY` / `__MODEL` / `__MAX_TOKENS` /
///   `__TEMPERATURE` / `__TIMEOUT_SECS`
/// - `LOCALAGENT_AGENT__MAX_STEPS`
/// - `LOCALAGENT_TOOLS__WEB_SEARCH__ENDPOINT`
fn apply_env_overrides<F>(mut config: Config, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = env("OPENAI_API_BASE") {
        config.model.api_base = val;
    }
    if let Some(val) = env("OPENAI_API_KEY") {
        config.model.api_key = val;
    }

    if let Some(val) = env("LOCALAGENT_MODEL__API_BASE") {
        config.model.api_base = val;
    }
    if let Some(val) = env("LOCALAGENT_MODEL__API_KEY") {
        config.model.api_key = val;
    }
    if let Some(val) = env("LOCALAGENT_MODEL__MODEL") {
        config.model.model = val;
    }
    if let Some(n) = parse_env(&env, "LOCALAGENT_MODEL__MAX_TOKENS")? {
        config.model.max_tokens = n;
    }
    if let Some(t) = parse_env(&env, "LOCALAGENT_MODEL__TEMPERATURE")? {
        config.model.temperature = t;
    }
    if let Some(s) = parse_env(&env, "LOCALAGENT_MODEL__TIMEOUT_SECS")? {
        config.model.timeout_secs = s;
    }
    if let Some(n) = parse_env(&env, "LOCALAGENT_AGENT__MAX_STEPS")? {
        config.agent.max_steps = n;
    }
    if let Some(val) = env("LOCALAGENT_TOOLS__WEB_SEARCH__ENDPOINT") {
        config.tools.web_search.endpoint = val;
    }

    Ok(config)
}

fn parse_env<F, T>(env: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::invalid(key, format!("'{raw}': {e}"))),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
