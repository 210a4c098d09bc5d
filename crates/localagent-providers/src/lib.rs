//! Chat model layer for localagent.
//!
//! # Architecture
//!
//! - [`traits::ChatModel`] — the one-method interface the agent loop drives
//! - [`http_provider::HttpChatModel`] — OpenAI-compatible HTTP client
//! - [`error::ProviderError`] — transport / protocol / upstream failures

pub mod error;
pub mod http_provider;
pub mod traits;

// Re-export main types for convenience
pub use error::ProviderError;
pub use http_provider::HttpChatModel;
pub use traits::{ChatModel, GenerationOptions};
