//! Completion API abstraction and implementations.
//!
//! The gateway talks to the completion service through [`CompletionClient`],
//! so the real Gemini backend can be swapped for a recording mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// One content part of a multi-part request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text { text: String },
    /// Base64-encoded media tagged with its media type.
    InlineData { mime_type: String, data: String },
}

/// Outbound `contents`: either a bare prompt or an ordered list of parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    Text(String),
    Parts(Vec<Part>),
}

/// A single call to the completion API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub contents: Contents,
}

/// Trait for generative completion backends (e.g., Gemini).
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one request and return the raw, untyped response body.
    async fn generate(&self, request: &CompletionRequest) -> Result<Value, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Convenience accessor for the text route: the concatenated text parts of
/// the first candidate, or an empty string when there are none.
pub fn text_of(response: &Value) -> String {
    response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}
