//! Modality-aware request dispatch.
//!
//! Validates an inbound request, shapes the outbound payload for its
//! modality, picks the model and performs exactly one completion call.

use super::normalizer::normalize;
use super::providers::{
    text_of, CompletionClient, CompletionRequest, Contents, Part, ProviderError,
};
use crate::models::{
    default_instruction, CompletionResult, MediaPayload, Modality, ModalityRequest, ModelTarget,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    UpstreamFailure(String),
}

impl From<ProviderError> for DispatchError {
    fn from(err: ProviderError) -> Self {
        DispatchError::UpstreamFailure(err.to_string())
    }
}

impl From<validator::ValidationErrors> for DispatchError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        messages.sort();
        DispatchError::InvalidInput(messages.join("; "))
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::InvalidInput(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            DispatchError::UpstreamFailure(msg) => AppError::UpstreamFailure(msg),
        }
    }
}

/// Routes modality requests to the completion API.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn CompletionClient>,
    models: ModelTarget,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn CompletionClient>, models: ModelTarget) -> Self {
        Self { client, models }
    }

    pub async fn dispatch(
        &self,
        request: ModalityRequest,
    ) -> Result<CompletionResult, DispatchError> {
        let modality = request.modality();
        match request {
            ModalityRequest::Text { prompt } => self.dispatch_text(&prompt).await,
            ModalityRequest::Image { prompt, media }
            | ModalityRequest::Document { prompt, media }
            | ModalityRequest::Audio { prompt, media } => {
                self.dispatch_media(modality, prompt.as_deref(), &media).await
            }
        }
    }

    /// Send a bare text prompt and return the response's primary text.
    pub async fn dispatch_text(&self, prompt: &str) -> Result<CompletionResult, DispatchError> {
        if prompt.is_empty() {
            return Err(DispatchError::InvalidInput(
                "Message is missing or has an invalid format.".to_string(),
            ));
        }

        let request = CompletionRequest {
            model: self.models.model_for(Modality::Text).to_string(),
            contents: Contents::Text(prompt.to_string()),
        };

        let response = self.call(Modality::Text, &request).await?;
        Ok(CompletionResult::new(text_of(&response)))
    }

    /// Send an instruction plus inline media and normalize the response.
    ///
    /// An absent prompt is replaced by the modality's default instruction,
    /// or an empty instruction when the modality has none.
    pub async fn dispatch_media(
        &self,
        modality: Modality,
        prompt: Option<&str>,
        media: &MediaPayload,
    ) -> Result<CompletionResult, DispatchError> {
        if modality == Modality::Text {
            return Err(DispatchError::InvalidInput(
                "Text requests carry no media".to_string(),
            ));
        }
        media.validate()?;

        let instruction = prompt
            .or_else(|| default_instruction(modality))
            .unwrap_or_default();

        let request = CompletionRequest {
            model: self.models.model_for(modality).to_string(),
            contents: Contents::Parts(vec![
                Part::Text {
                    text: instruction.to_string(),
                },
                Part::InlineData {
                    mime_type: media.mime_type.clone(),
                    data: STANDARD.encode(&media.data),
                },
            ]),
        };

        let response = self.call(modality, &request).await?;
        Ok(CompletionResult::new(normalize(&response)))
    }

    async fn call(
        &self,
        modality: Modality,
        request: &CompletionRequest,
    ) -> Result<serde_json::Value, DispatchError> {
        tracing::debug!(
            %modality,
            model = %request.model,
            "Dispatching completion request"
        );

        self.client.generate(request).await.map_err(|e| {
            tracing::error!(
                %modality,
                model = %request.model,
                error = %e,
                "Completion request failed"
            );
            DispatchError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::MockCompletionClient;
    use serde_json::json;

    fn dispatcher(client: Arc<MockCompletionClient>) -> Dispatcher {
        Dispatcher::new(client, ModelTarget::default())
    }

    #[tokio::test]
    async fn text_prompt_is_sent_once_to_text_model() {
        let client = Arc::new(MockCompletionClient::replying(json!({
            "candidates": [{"content": {"parts": [{"text": "Halo!"}]}}]
        })));

        let result = dispatcher(client.clone())
            .dispatch_text("Hai Gemini")
            .await
            .unwrap();
        assert_eq!(result.text, "Halo!");

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "gemini-2.5-flash-lite");
        assert_eq!(calls[0].contents, Contents::Text("Hai Gemini".to_string()));
    }

    #[tokio::test]
    async fn empty_text_prompt_makes_no_call() {
        let client = Arc::new(MockCompletionClient::replying(json!({})));

        let err = dispatcher(client.clone()).dispatch_text("").await.unwrap_err();
        assert!(matches!(err, DispatchError::InvalidInput(_)));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn document_without_prompt_uses_default_instruction() {
        let client = Arc::new(MockCompletionClient::replying(json!({
            "response": {"candidates": [{"content": {"text": "summary"}}]}
        })));
        let media = MediaPayload::new(b"%PDF-1.4".to_vec(), "application/pdf");

        let result = dispatcher(client.clone())
            .dispatch_media(Modality::Document, None, &media)
            .await
            .unwrap();
        assert_eq!(result.text, "summary");

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "gemini-2.5-flash-lite");
        assert_eq!(
            calls[0].contents,
            Contents::Parts(vec![
                Part::Text {
                    text: "Summarize the following document:".to_string()
                },
                Part::InlineData {
                    mime_type: "application/pdf".to_string(),
                    data: STANDARD.encode(b"%PDF-1.4"),
                },
            ])
        );
    }

    #[tokio::test]
    async fn image_without_prompt_sends_empty_instruction() {
        let client = Arc::new(MockCompletionClient::replying(json!({})));
        let media = MediaPayload::new(vec![0x89, 0x50, 0x4e, 0x47], "image/png");

        dispatcher(client.clone())
            .dispatch_media(Modality::Image, None, &media)
            .await
            .unwrap();

        let calls = client.calls();
        assert_eq!(calls[0].model, "gemini-2.5-flash");
        match &calls[0].contents {
            Contents::Parts(parts) => {
                assert_eq!(parts[0], Part::Text { text: String::new() })
            }
            other => panic!("unexpected contents: {:?}", other),
        }
    }

    #[tokio::test]
    async fn explicit_prompt_overrides_default() {
        let client = Arc::new(MockCompletionClient::replying(json!({})));
        let media = MediaPayload::new(vec![1, 2, 3], "audio/mpeg");

        dispatcher(client.clone())
            .dispatch(ModalityRequest::Audio {
                prompt: Some("Translate this audio".to_string()),
                media,
            })
            .await
            .unwrap();

        match &client.calls()[0].contents {
            Contents::Parts(parts) => assert_eq!(
                parts[0],
                Part::Text {
                    text: "Translate this audio".to_string()
                }
            ),
            other => panic!("unexpected contents: {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_media_fails_before_any_call() {
        let client = Arc::new(MockCompletionClient::replying(json!({})));
        let media = MediaPayload::new(Vec::new(), "audio/mpeg");

        let err = dispatcher(client.clone())
            .dispatch_media(Modality::Audio, None, &media)
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::InvalidInput(ref m) if m == "uploaded file is empty"));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn unmatched_media_response_is_pretty_printed() {
        let raw = json!({"candidates": [{"content": {"parts": [{"text": "hi"}]}}]});
        let client = Arc::new(MockCompletionClient::replying(raw.clone()));
        let media = MediaPayload::new(vec![1], "image/jpeg");

        let result = dispatcher(client)
            .dispatch_media(Modality::Image, Some("What is this?"), &media)
            .await
            .unwrap();

        assert_eq!(result.text, serde_json::to_string_pretty(&raw).unwrap());
    }

    #[tokio::test]
    async fn upstream_error_becomes_upstream_failure() {
        let client = Arc::new(MockCompletionClient::failing("quota exhausted"));
        let media = MediaPayload::new(vec![1], "image/jpeg");

        let err = dispatcher(client.clone())
            .dispatch_media(Modality::Image, Some("x"), &media)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "API error: quota exhausted");
        assert!(matches!(err, DispatchError::UpstreamFailure(_)));
        assert_eq!(client.calls().len(), 1);
    }
}
