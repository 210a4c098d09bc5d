//! Tool trait — the interface every agent tool implements.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

/// Arguments for a tool call, keyed by parameter name.
pub type ToolArgs = HashMap<String, Value>;

// ─────────────────────────────────────────────
// Input schema
// ─────────────────────────────────────────────

/// Semantic type of a tool parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    String,
    /// A JSON number without a fractional part that fits in `i64`.
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }

    /// Whether `value` has this semantic type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.as_i64().is_some(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared tool input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamType,
    pub description: &'static str,
    pub optional: bool,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            optional: false,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            optional: true,
        }
    }
}

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every agent tool implements this trait.
///
/// The registry checks arguments against `inputs()` before `execute()` runs,
/// so handlers may assume required parameters are present and well-typed.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model uses to call this tool (e.g. `"fetch_inventory"`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// Declared inputs, in prompt order.
    fn inputs(&self) -> &[ParamSpec];

    /// Execute the tool. The string result is what the model reads.
    async fn execute(&self, args: &ToolArgs) -> anyhow::Result<String>;
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required `String` param, returning a user-friendly error.
pub fn require_string<'a>(args: &'a ToolArgs, key: &str) -> anyhow::Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))
}

/// Extract a required integer param.
pub fn require_i64(args: &ToolArgs, key: &str) -> anyhow::Result<i64> {
    args.get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))
}

/// Extract an optional integer param.
pub fn optional_i64(args: &ToolArgs, key: &str) -> Option<i64> {
    args.get(key).and_then(|v| v.as_i64())
}
