//! Inventory tools — a story-game item counter the model can read and edit.
//!
//! The `Inventory` handle owns the state; both tools hold a clone of it.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use super::base::{require_i64, require_string, ParamSpec, ParamType, Tool, ToolArgs};

/// Why an inventory update was refused. State is untouched in every case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("error! this would leave you with {resulting} of {item} in inventory. It cannot be done!")]
    NegativeQuantity { item: String, resulting: i64 },

    #[error("error! the quantity of {item} would overflow")]
    Overflow { item: String },
}

// ─────────────────────────────────────────────
// Inventory state
// ─────────────────────────────────────────────

/// Item name → quantity. Quantities are never negative.
#[derive(Clone, Debug, Default)]
pub struct Inventory {
    items: Arc<Mutex<BTreeMap<String, i64>>>,
}

impl Inventory {
    /// Build an inventory from explicit starting quantities.
    pub fn new<I, S>(initial: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let items = initial.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            items: Arc::new(Mutex::new(items)),
        }
    }

    /// The starting inventory: three apples and one orange.
    pub fn starter() -> Self {
        Self::new([("apple", 3), ("orange", 1)])
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, i64>> {
        // Every update is all-or-nothing, so a poisoned map is still consistent.
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add `modifier` to `item` (absent items count as zero).
    ///
    /// Returns the new quantity, or an error if it would drop below zero.
    pub fn update(&self, item: &str, modifier: i64) -> Result<i64, InventoryError> {
        let mut items = self.lock();
        let current = items.get(item).copied().unwrap_or(0);
        let resulting = current
            .checked_add(modifier)
            .ok_or_else(|| InventoryError::Overflow {
                item: item.to_string(),
            })?;
        if resulting < 0 {
            return Err(InventoryError::NegativeQuantity {
                item: item.to_string(),
                resulting,
            });
        }
        items.insert(item.to_string(), resulting);
        Ok(resulting)
    }

    pub fn quantity(&self, item: &str) -> Option<i64> {
        self.lock().get(item).copied()
    }

    /// Copy of the current mapping.
    pub fn snapshot(&self) -> BTreeMap<String, i64> {
        self.lock().clone()
    }
}

// ─────────────────────────────────────────────
// inventory_updater
// ─────────────────────────────────────────────

const UPDATER_INPUTS: &[ParamSpec] = &[
    ParamSpec::required(
        "objectName",
        ParamType::String,
        "the name of the object being updated (example: 'apple')",
    ),
    ParamSpec::required(
        "quantityModifier",
        ParamType::Integer,
        "How much to increase or decrease the number held (positive if adding, negative if removing)",
    ),
];

pub struct InventoryUpdaterTool {
    inventory: Inventory,
}

impl InventoryUpdaterTool {
    pub fn new(inventory: Inventory) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl Tool for InventoryUpdaterTool {
    fn name(&self) -> &str {
        "inventory_updater"
    }

    fn description(&self) -> &str {
        "A tool that will update the user's inventory if a story event occurs. Returns whether \
         or not the inventory update was successful. Object names will always be in the singular."
    }

    fn inputs(&self) -> &[ParamSpec] {
        UPDATER_INPUTS
    }

    async fn execute(&self, args: &ToolArgs) -> anyhow::Result<String> {
        let item = require_string(args, "objectName")?;
        let modifier = require_i64(args, "quantityModifier")?;

        let quantity = self.inventory.update(item, modifier)?;
        info!(item = item, modifier = modifier, quantity = quantity, "inventory updated");
        Ok(format!("Success - you now have {quantity} of {item}"))
    }
}

// ─────────────────────────────────────────────
// fetch_inventory
// ─────────────────────────────────────────────

pub struct FetchInventoryTool {
    inventory: Inventory,
}

impl FetchInventoryTool {
    pub fn new(inventory: Inventory) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl Tool for FetchInventoryTool {
    fn name(&self) -> &str {
        "fetch_inventory"
    }

    fn description(&self) -> &str {
        "A tool that will fetch the user's current inventory in dictionary (JSON) format"
    }

    fn inputs(&self) -> &[ParamSpec] {
        &[]
    }

    async fn execute(&self, _args: &ToolArgs) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&self.inventory.snapshot())?)
    }
}
