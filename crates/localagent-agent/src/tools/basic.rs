//! Small self-contained tools: the terminating `final_answer`, arithmetic,
//! and a placeholder for experimenting with new tools.

use async_trait::async_trait;

use super::base::{require_i64, require_string, ParamSpec, ParamType, Tool, ToolArgs};

/// Name of the tool that ends an agent run.
pub const FINAL_ANSWER: &str = "final_answer";

// ─────────────────────────────────────────────
// final_answer
// ─────────────────────────────────────────────

const FINAL_ANSWER_INPUTS: &[ParamSpec] = &[ParamSpec::required(
    "answer",
    ParamType::String,
    "The final answer to return to the user.",
)];

/// Returns its `answer` argument unchanged. The agent loop stops on it.
pub struct FinalAnswerTool;

#[async_trait]
impl Tool for FinalAnswerTool {
    fn name(&self) -> &str {
        FINAL_ANSWER
    }

    fn description(&self) -> &str {
        "Use this tool to return the final answer to the user after reasoning is complete."
    }

    fn inputs(&self) -> &[ParamSpec] {
        FINAL_ANSWER_INPUTS
    }

    async fn execute(&self, args: &ToolArgs) -> anyhow::Result<String> {
        Ok(require_string(args, "answer")?.to_string())
    }
}

// ─────────────────────────────────────────────
// multiply_two_numbers
// ─────────────────────────────────────────────

const MULTIPLY_INPUTS: &[ParamSpec] = &[
    ParamSpec::required("num1", ParamType::Integer, "the first number to multiply"),
    ParamSpec::required("num2", ParamType::Integer, "the second number to multiply"),
];

pub struct MultiplyTool;

#[async_trait]
impl Tool for MultiplyTool {
    fn name(&self) -> &str {
        "multiply_two_numbers"
    }

    fn description(&self) -> &str {
        "A tool that takes in two integers and multiplies them, returning the product."
    }

    fn inputs(&self) -> &[ParamSpec] {
        MULTIPLY_INPUTS
    }

    async fn execute(&self, args: &ToolArgs) -> anyhow::Result<String> {
        let a = require_i64(args, "num1")?;
        let b = require_i64(args, "num2")?;
        let product = a
            .checked_mul(b)
            .ok_or_else(|| anyhow::anyhow!("{a} * {b} overflows a 64-bit integer"))?;
        Ok(product.to_string())
    }
}

// ─────────────────────────────────────────────
// my_custom_tool
// ─────────────────────────────────────────────

const CUSTOM_INPUTS: &[ParamSpec] = &[
    ParamSpec::required("arg1", ParamType::String, "the first argument"),
    ParamSpec::required("arg2", ParamType::Integer, "the second argument"),
];

/// Does nothing yet; a template for the next tool.
pub struct CustomTool;

#[async_trait]
impl Tool for CustomTool {
    fn name(&self) -> &str {
        "my_custom_tool"
    }

    fn description(&self) -> &str {
        "A tool that does nothing yet"
    }

    fn inputs(&self) -> &[ParamSpec] {
        CUSTOM_INPUTS
    }

    async fn execute(&self, _args: &ToolArgs) -> anyhow::Result<String> {
        Ok("What magic will you build ?".to_string())
    }
}
