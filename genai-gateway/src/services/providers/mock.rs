//! Mock completion client for testing.

use super::{CompletionClient, CompletionRequest, ProviderError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

enum MockReply {
    Json(Value),
    Fail(String),
}

/// Records every request and answers with a scripted reply.
pub struct MockCompletionClient {
    reply: MockReply,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionClient {
    /// Answer every request with `response`.
    pub fn replying(response: Value) -> Self {
        Self {
            reply: MockReply::Json(response),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail every request with an API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Fail(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn generate(&self, request: &CompletionRequest) -> Result<Value, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        match &self.reply {
            MockReply::Json(value) => Ok(value.clone()),
            MockReply::Fail(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.reply {
            MockReply::Json(_) => Ok(()),
            MockReply::Fail(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }
}
