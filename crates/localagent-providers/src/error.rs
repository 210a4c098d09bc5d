//! Chat model error types.

use thiserror::Error;

/// Why a `generate` call failed. The adapter never retries; callers decide.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection refused, DNS failure, timeout, or the body could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered 2xx but the body is not a usable completion.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The endpoint answered with a non-success status.
    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },
}

impl ProviderError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }
}
