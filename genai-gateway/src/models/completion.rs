use serde::{Deserialize, Serialize};

/// Text extracted from a completion response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub text: String,
}

impl CompletionResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Body returned by `POST /generate-text`.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateTextResponse {
    pub reply: String,
}

impl From<CompletionResult> for GenerateTextResponse {
    fn from(result: CompletionResult) -> Self {
        Self { reply: result.text }
    }
}

/// Body returned by the image, document and audio routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateMediaResponse {
    pub result: String,
}

impl From<CompletionResult> for GenerateMediaResponse {
    fn from(result: CompletionResult) -> Self {
        Self {
            result: result.text,
        }
    }
}
