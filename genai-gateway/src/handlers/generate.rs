//! The four generation routes.

use crate::models::{
    GenerateMediaResponse, GenerateTextResponse, MediaPayload, Modality, ModalityRequest,
};
use crate::services::DispatchError;
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::Value;
use service_core::error::AppError;

const PROMPT_FIELD: &str = "prompt";
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// `POST /generate-text` with `{"message": "..."}`.
///
/// A missing or unparsable body is treated like a missing message.
pub async fn generate_text(
    State(state): State<AppState>,
    payload: Option<Json<Value>>,
) -> Result<Json<GenerateTextResponse>, AppError> {
    let message = payload
        .as_ref()
        .and_then(|Json(body)| body.get("message"))
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .ok_or_else(|| {
            DispatchError::InvalidInput("Message is missing or has an invalid format.".to_string())
        })?;

    let result = state.dispatcher.dispatch_text(message).await?;

    Ok(Json(result.into()))
}

/// `POST /generate-from-image`, multipart `image` + `prompt`.
pub async fn generate_from_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateMediaResponse>, AppError> {
    generate_from_media(&state, multipart, Modality::Image).await
}

/// `POST /generate-from-document`, multipart `document` + optional `prompt`.
pub async fn generate_from_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateMediaResponse>, AppError> {
    generate_from_media(&state, multipart, Modality::Document).await
}

/// `POST /generate-from-audio`, multipart `audio` + optional `prompt`.
pub async fn generate_from_audio(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateMediaResponse>, AppError> {
    generate_from_media(&state, multipart, Modality::Audio).await
}

async fn generate_from_media(
    state: &AppState,
    multipart: Multipart,
    modality: Modality,
) -> Result<Json<GenerateMediaResponse>, AppError> {
    let (prompt, media) = read_media_form(multipart, modality.as_str()).await?;

    let media = media.ok_or_else(|| {
        DispatchError::InvalidInput(format!("No {} file uploaded", modality.as_str()))
    })?;
    let media_type = media.mime_type.clone();
    let size = media.data.len();
    let has_prompt = prompt.is_some();

    let request = ModalityRequest::media(modality, prompt, media).ok_or_else(|| {
        DispatchError::InvalidInput(format!("{} requests carry no media", modality))
    })?;

    tracing::info!(
        %modality,
        mime_type = %media_type,
        size,
        has_prompt,
        "Media generation request received"
    );

    let result = state.dispatcher.dispatch(request).await?;

    Ok(Json(result.into()))
}

/// Read the file field named `file_field` and the optional prompt.
///
/// Unknown fields are skipped. An empty prompt counts as absent. A second
/// file under `file_field` is rejected.
async fn read_media_form(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<(Option<String>, Option<MediaPayload>), AppError> {
    let mut prompt = None;
    let mut media = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            name if name == file_field => {
                let mime_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_MIME_TYPE)
                    .to_string();

                if media.is_some() {
                    return Err(AppError::BadRequest(anyhow::anyhow!(
                        "Multiple {} files uploaded",
                        file_field
                    )));
                }

                // The whole upload is buffered; the body limit caps its size
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e))
                })?;

                media = Some(MediaPayload::new(data.to_vec(), mime_type));
            }
            PROMPT_FIELD => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read prompt: {}", e))
                })?;
                prompt = Some(text).filter(|p| !p.is_empty());
            }
            _ => {}
        }
    }

    Ok((prompt, media))
}
