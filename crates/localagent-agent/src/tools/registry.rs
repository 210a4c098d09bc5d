//! Tool Registry — built once at startup, then only read.
//!
//! The agent loop dispatches model tool calls here by name. Arguments are
//! checked against each tool's declared inputs before the handler runs.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::base::{Tool, ToolArgs};

/// Why a registration or invocation failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a tool named '{0}' is already registered")]
    DuplicateName(String),

    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {reason}")]
    Argument { tool: String, reason: String },

    #[error("error executing {tool}: {message}")]
    Handler { tool: String, message: String },
}

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools keyed by name and dispatches calls.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Names are unique; a second tool with the same name is
    /// rejected and the first one stays.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            warn!(tool = %name, "duplicate tool registration rejected");
            return Err(RegistryError::DuplicateName(name));
        }
        info!(tool = %name, "registered tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Names of all registered tools, sorted for determinism.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Plain-text listing of every tool and its inputs, for the system prompt.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for name in self.tool_names() {
            let tool = &self.tools[&name];
            let _ = writeln!(out, "- {}: {}", name, tool.description());
            if tool.inputs().is_empty() {
                let _ = writeln!(out, "    (no inputs)");
            }
            for param in tool.inputs() {
                let optional = if param.optional { ", optional" } else { "" };
                let _ = writeln!(
                    out,
                    "    {} ({}{}): {}",
                    param.name, param.kind, optional, param.description
                );
            }
        }
        out.trim_end().to_string()
    }

    /// Validate `args` against the tool's inputs and run it.
    pub async fn invoke(&self, name: &str, args: &ToolArgs) -> Result<String, RegistryError> {
        let tool = self.tools.get(name).ok_or_else(|| {
            warn!(tool = name, "tool not found");
            RegistryError::UnknownTool(name.to_string())
        })?;

        check_args(tool.as_ref(), args).map_err(|reason| {
            warn!(tool = name, reason = %reason, "rejected tool arguments");
            RegistryError::Argument {
                tool: name.to_string(),
                reason,
            }
        })?;

        match tool.execute(args).await {
            Ok(result) => {
                debug!(tool = name, result_len = result.len(), "tool succeeded");
                Ok(result)
            }
            Err(e) => {
                warn!(tool = name, error = %e, "tool execution failed");
                Err(RegistryError::Handler {
                    tool: name.to_string(),
                    message: format!("{e:#}"),
                })
            }
        }
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A `null` value counts as absent. Undeclared extra keys are ignored.
fn check_args(tool: &dyn Tool, args: &ToolArgs) -> Result<(), String> {
    for param in tool.inputs() {
        match args.get(param.name).filter(|v| !v.is_null()) {
            None if param.optional => {}
            None => return Err(format!("missing required parameter '{}'", param.name)),
            Some(value) if !param.kind.accepts(value) => {
                return Err(format!(
                    "parameter '{}' must be of type {}, got {}",
                    param.name, param.kind, value
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::base::{ParamSpec, ParamType};
    use async_trait::async_trait;
    use serde_json::json;

    /// Minimal test tool.
    struct EchoTool;

    const ECHO_INPUTS: &[ParamSpec] = &[
        ParamSpec::required("text", ParamType::String, "Text to echo"),
        ParamSpec::optional("times", ParamType::Integer, "Repeat count"),
    ];

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn inputs(&self) -> &[ParamSpec] {
            ECHO_INPUTS
        }
        async fn execute(&self, args: &ToolArgs) -> anyhow::Result<String> {
            let text = args["text"].as_str().unwrap_or_default();
            let times = args.get("times").and_then(|v| v.as_u64()).unwrap_or(1) as usize;
            Ok(text.repeat(times))
        }
    }

    /// Tool that always fails.
    struct FailTool;

    #[async_trait]
    impl Tool for FailTool {
        fn name(&self) -> &str {
            "fail"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn inputs(&self) -> &[ParamSpec] {
            &[]
        }
        async fn execute(&self, _args: &ToolArgs) -> anyhow::Result<String> {
            anyhow::bail!("intentional failure")
        }
    }

    fn args(value: serde_json::Value) -> ToolArgs {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool)).unwrap();
        assert!(reg.has("echo"));
        assert!(!reg.has("nope"));
        assert!(reg.get("echo").is_some());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_register_duplicate_rejected() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool)).unwrap();
        let err = reg.register(Arc::new(EchoTool)).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("echo".into()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_tool_names_sorted() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(FailTool)).unwrap();
        reg.register(Arc::new(EchoTool)).unwrap();
        assert_eq!(reg.tool_names(), vec!["echo", "fail"]);
    }

    #[test]
    fn test_describe() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(FailTool)).unwrap();
        reg.register(Arc::new(EchoTool)).unwrap();
        let text = reg.describe();
        assert_eq!(
            text,
            "- echo: Echoes back the input\n    text (string): Text to echo\n    times (integer, optional): Repeat count\n- fail: Always fails\n    (no inputs)"
        );
    }

    #[tokio::test]
    async fn test_invoke_success_returns_handler_result() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool)).unwrap();
        let result = reg.invoke("echo", &args(json!({"text": "hi", "times": 3}))).await;
        assert_eq!(result.unwrap(), "hihihi");
    }

    #[tokio::test]
    async fn test_invoke_ignores_extra_and_null_optional() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool)).unwrap();
        let result = reg
            .invoke("echo", &args(json!({"text": "x", "times": null, "extra": 1})))
            .await;
        assert_eq!(result.unwrap(), "x");
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let reg = ToolRegistry::new();
        let err = reg.invoke("missing", &ToolArgs::new()).await.unwrap_err();
        assert_eq!(err, RegistryError::UnknownTool("missing".into()));
        assert_eq!(err.to_string(), "unknown tool 'missing'");
    }

    #[tokio::test]
    async fn test_invoke_missing_argument() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool)).unwrap();
        let err = reg.invoke("echo", &ToolArgs::new()).await.unwrap_err();
        match err {
            RegistryError::Argument { tool, reason } => {
                assert_eq!(tool, "echo");
                assert!(reason.contains("missing required parameter 'text'"));
            }
            other => panic!("expected argument error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invoke_wrong_type() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool)).unwrap();
        let err = reg
            .invoke("echo", &args(json!({"text": "x", "times": "two"})))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Argument { .. }));
        assert!(err.to_string().contains("must be of type integer"));
    }

    #[tokio::test]
    async fn test_invoke_handler_error() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(FailTool)).unwrap();
        let err = reg.invoke("fail", &ToolArgs::new()).await.unwrap_err();
        assert_eq!(
            err,
            RegistryError::Handler {
                tool: "fail".into(),
                message: "intentional failure".into()
            }
        );
        assert!(err.to_string().starts_with("error executing fail:"));
    }

    #[test]
    fn test_default() {
        let reg = ToolRegistry::default();
        assert!(reg.is_empty());
    }
}
