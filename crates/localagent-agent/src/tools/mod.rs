//! Tool modules for the agent.

pub mod base;
pub mod basic;
pub mod inventory;
pub mod registry;
pub mod time;
pub mod web;

use std::sync::Arc;

use localagent_core::config::WebSearchConfig;

pub use base::{ParamSpec, ParamType, Tool, ToolArgs};
pub use basic::FINAL_ANSWER;
pub use inventory::Inventory;
pub use registry::{RegistryError, ToolRegistry};

/// Build the registry with every built-in tool.
pub fn builtin_registry(
    inventory: Inventory,
    search: &WebSearchConfig,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(basic::FinalAnswerTool))?;
    registry.register(Arc::new(web::WebSearchTool::new(search)))?;
    registry.register(Arc::new(time::CurrentTimeTool))?;
    registry.register(Arc::new(basic::CustomTool))?;
    registry.register(Arc::new(basic::MultiplyTool))?;
    registry.register(Arc::new(inventory::InventoryUpdaterTool::new(inventory.clone())))?;
    registry.register(Arc::new(inventory::FetchInventoryTool::new(inventory)))?;
    Ok(registry)
}
