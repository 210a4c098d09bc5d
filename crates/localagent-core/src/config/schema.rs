//! Configuration schema.
//!
//! Hierarchy: `Config` → `ModelConfig`, `AgentConfig`, `ToolsConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Placeholder endpoint used when neither the config file nor
/// `OPENAI_API_BASE` names one.
pub const DEFAULT_API_BASE: &str = "http://YOUR_LLAMA_CPP_BASE_URL:8080";

/// DuckDuckGo's JavaScript-free results page.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration, loaded from `~/.localagent/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub model: ModelConfig,
    pub agent: AgentConfig,
    pub tools: ToolsConfig,
}

impl Config {
    /// Reject values the agent cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.model;
        if m.api_base.trim().is_empty() {
            return Err(ConfigError::invalid("model.apiBase", "must not be empty"));
        }
        if m.model.trim().is_empty() {
            return Err(ConfigError::invalid("model.model", "must not be empty"));
        }
        if m.max_tokens == 0 {
            return Err(ConfigError::invalid("model.maxTokens", "must be positive"));
        }
        if !m.temperature.is_finite() || !(0.0..=2.0).contains(&m.temperature) {
            return Err(ConfigError::invalid(
                "model.temperature",
                format!("must be within 0.0 – 2.0, got {}", m.temperature),
            ));
        }
        if m.timeout_secs == 0 {
            return Err(ConfigError::invalid("model.timeoutSecs", "must be positive"));
        }
        if self.agent.max_steps == 0 {
            return Err(ConfigError::invalid("agent.maxSteps", "must be at least 1"));
        }
        let search = &self.tools.web_search;
        if !(1..=10).contains(&search.max_results) {
            return Err(ConfigError::invalid(
                "tools.webSearch.maxResults",
                format!("must be within 1 – 10, got {}", search.max_results),
            ));
        }
        if search.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "tools.webSearch.timeoutSecs",
                "must be positive",
            ));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Model endpoint
// ─────────────────────────────────────────────

/// The chat-completions endpoint and generation options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    /// Bearer token. Empty means no `Authorization` header.
    pub api_key: String,
    /// Model identifier sent in every request.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            model: "mikes-model".to_string(),
            max_tokens: 2096,
            temperature: 0.5,
            timeout_secs: 120,
        }
    }
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Name used in logs and the REPL banner.
    pub name: String,
    /// Model replies allowed per run before giving up.
    pub max_steps: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "local_llm_agent".to_string(),
            max_steps: 6,
        }
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    pub web_search: WebSearchConfig,
}

/// Web search tool configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebSearchConfig {
    /// HTML search endpoint (queried with `?q=`).
    pub endpoint: String,
    /// Results returned when the model does not ask for a count.
    pub max_results: u32,
    pub timeout_secs: u64,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            max_results: 5,
            timeout_secs: 30,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
