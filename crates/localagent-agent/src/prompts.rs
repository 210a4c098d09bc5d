//! Prompt templates loaded from a YAML file.
//!
//! Only `system_prompt` is interpreted. It may contain two placeholders:
//! `{{tools}}` (the registry's tool listing) and `{{max_steps}}`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Default template file name, looked up in the working directory.
pub const DEFAULT_PROMPTS_FILE: &str = "prompts.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplates {
    pub system_prompt: String,
    /// Every other top-level key, kept as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl PromptTemplates {
    /// Read and parse a template file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read prompt templates {}", path.display()))?;
        let templates = Self::from_yaml(&content)
            .with_context(|| format!("invalid prompt templates {}", path.display()))?;
        debug!(
            path = %path.display(),
            extra_keys = templates.extra.len(),
            "loaded prompt templates"
        );
        Ok(templates)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Fill in the system prompt placeholders.
    pub fn render_system_prompt(&self, tools_description: &str, max_steps: usize) -> String {
        self.system_prompt
            .replace("{{tools}}", tools_description)
            .replace("{{max_steps}}", &max_steps.to_string())
    }
}
