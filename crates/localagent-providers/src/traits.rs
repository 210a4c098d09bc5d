//! Chat model trait — the seam between the agent loop and an LLM backend.
//!
//! `HttpChatModel` in `http_provider.rs` covers any OpenAI-compatible API;
//! tests substitute scripted implementations.

use async_trait::async_trait;
use localagent_core::config::ModelConfig;
use localagent_core::types::Message;

use crate::error::ProviderError;

/// Options passed to each `generate` call.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationOptions {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 2096,
            temperature: 0.5,
        }
    }
}

impl From<&ModelConfig> for GenerationOptions {
    fn from(config: &ModelConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Something that turns a conversation into the next assistant message.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the full history and wait for one complete reply.
    ///
    /// Returns the first completion's message. No retries are attempted.
    async fn generate(
        &self,
        conversation: &[Message],
        options: &GenerationOptions,
    ) -> Result<Message, ProviderError>;

    /// Model identifier, for logging.
    fn model_id(&self) -> &str;
}
