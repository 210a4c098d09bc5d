//! localagent core — wire types, configuration, and shared helpers.
//!
//! - **types**: chat-completions messages, request and response bodies
//! - **config**: schema, loader, env var overrides
//! - **utils**: data paths and string helpers

pub mod config;
pub mod types;
pub mod utils;

pub use config::{Config, ConfigError};
pub use types::{Message, Role};
