//! Generic HTTP chat model for OpenAI-compatible APIs.
//!
//! Talks directly to any `/chat/completions` endpoint (llama.cpp server,
//! vLLM, Ollama's OpenAI shim, api.openai.com) with one blocking POST per
//! `generate` call.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use localagent_core::config::ModelConfig;
use localagent_core::types::{
    ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse, Message, Role,
};
use localagent_core::utils::truncate_string;

use crate::error::ProviderError;
use crate::traits::{ChatModel, GenerationOptions};

/// Upstream error bodies are cut to this many characters.
const MAX_ERROR_BODY_CHARS: usize = 500;

// ─────────────────────────────────────────────
// HttpChatModel
// ─────────────────────────────────────────────

/// A chat model that talks to an OpenAI-compatible HTTP API via `reqwest`.
pub struct HttpChatModel {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"http://localhost:8080/v1"`).
    api_base: String,
    /// Bearer token; empty means no `Authorization` header.
    api_key: String,
    /// Model identifier sent in every request.
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for HttpChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChatModel")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpChatModel {
    /// Create a chat model from the `model` config section.
    pub fn new(config: &ModelConfig) -> Result<Self, ProviderError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpChatModel {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::transport(format!(
                "request timed out after {}s",
                self.timeout.as_secs()
            ))
        } else {
            ProviderError::transport(format!("HTTP request failed: {e}"))
        }
    }
}

/// Prefer the `error.message` field of a JSON error body over the raw text.
fn upstream_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => "(empty body)".to_string(),
        Err(_) => truncate_string(body.trim(), MAX_ERROR_BODY_CHARS),
    }
}

/// Extract the first choice's message from a successful response body.
fn parse_completion(body: &str) -> Result<Message, ProviderError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::protocol(format!("invalid completion body: {e}")))?;

    if let Some(usage) = &parsed.usage {
        debug!(
            id = parsed.id.as_deref().unwrap_or("-"),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "token usage"
        );
    }

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::protocol("no choices in response"))?;

    match choice.finish_reason.as_deref() {
        Some("length") => warn!("reply was cut off by the max_tokens limit"),
        reason => debug!(finish_reason = reason.unwrap_or("-"), "completion finished"),
    }

    let content = choice
        .message
        .content
        .ok_or_else(|| ProviderError::protocol("first choice has no content"))?;

    Ok(Message::new(Role::Assistant, content))
}

#[async_trait]
impl ChatModel for HttpChatModel {
    async fn generate(
        &self,
        conversation: &[Message],
        options: &GenerationOptions,
    ) -> Result<Message, ProviderError> {
        debug!(
            model = %self.model,
            messages = conversation.len(),
            max_tokens = options.max_tokens,
            temperature = options.temperature,
            "Calling LLM"
        );

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: conversation,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let mut request = self.client.post(self.completions_url()).json(&request_body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await.map_err(|e| {
            let err = self.map_send_error(e);
            error!(model = %self.model, error = %err, "HTTP request failed");
            err
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(model = %self.model, error = %e, "failed to read response body");
            self.map_send_error(e)
        })?;

        if !status.is_success() {
            let message = upstream_message(&body);
            error!(model = %self.model, status = %status, body = %message, "API error");
            return Err(ProviderError::upstream(status.as_u16(), message));
        }

        let reply = parse_completion(&body).map_err(|e| {
            error!(model = %self.model, error = %e, "Failed to parse LLM response");
            e
        })?;

        debug!(model = %self.model, reply_len = reply.content.len(), "LLM response received");
        Ok(reply)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
