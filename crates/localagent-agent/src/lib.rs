//! localagent agent — the loop, its tools, and prompt templates.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, inventory, and built-in tools
//! - **action**: parsing a model reply into a tool call or an answer
//! - **prompts**: YAML prompt templates and system prompt rendering
//! - **agent_loop**: The model ↔ tool state machine

pub mod action;
pub mod agent_loop;
pub mod prompts;
pub mod tools;

pub use agent_loop::{Agent, AgentError, RunReport, DEFAULT_MAX_STEPS};
pub use prompts::{PromptTemplates, DEFAULT_PROMPTS_FILE};
pub use tools::{builtin_registry, Inventory, Tool, ToolRegistry};
