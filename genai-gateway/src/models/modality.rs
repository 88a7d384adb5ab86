//! Request modalities and the per-modality routing tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Media kind of an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
    Document,
    Audio,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Document => "document",
            Modality::Audio => "audio",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instruction sent when a media request arrives without a prompt.
///
/// Image is deliberately absent: an image request without a prompt is sent
/// with an empty instruction.
const DEFAULT_INSTRUCTIONS: &[(Modality, &str)] = &[
    (Modality::Document, "Summarize the following document:"),
    (Modality::Audio, "Transcribe the following audio:"),
];

pub fn default_instruction(modality: Modality) -> Option<&'static str> {
    DEFAULT_INSTRUCTIONS
        .iter()
        .find(|(m, _)| *m == modality)
        .map(|(_, instruction)| *instruction)
}

/// Uploaded binary content and its declared media type.
#[derive(Debug, Clone, Validate)]
pub struct MediaPayload {
    #[validate(length(min = 1, message = "uploaded file is empty"))]
    pub data: Vec<u8>,

    #[validate(length(min = 1, message = "media type is missing"))]
    pub mime_type: String,
}

impl MediaPayload {
    pub fn new(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// A validated inbound request, tagged by modality.
#[derive(Debug, Clone)]
pub enum ModalityRequest {
    Text {
        prompt: String,
    },
    Image {
        prompt: Option<String>,
        media: MediaPayload,
    },
    Document {
        prompt: Option<String>,
        media: MediaPayload,
    },
    Audio {
        prompt: Option<String>,
        media: MediaPayload,
    },
}

impl ModalityRequest {
    pub fn modality(&self) -> Modality {
        match self {
            ModalityRequest::Text { .. } => Modality::Text,
            ModalityRequest::Image { .. } => Modality::Image,
            ModalityRequest::Document { .. } => Modality::Document,
            ModalityRequest::Audio { .. } => Modality::Audio,
        }
    }

    /// Build a media request for `modality`. Returns `None` for text.
    pub fn media(modality: Modality, prompt: Option<String>, media: MediaPayload) -> Option<Self> {
        match modality {
            Modality::Text => None,
            Modality::Image => Some(ModalityRequest::Image { prompt, media }),
            Modality::Document => Some(ModalityRequest::Document { prompt, media }),
            Modality::Audio => Some(ModalityRequest::Audio { prompt, media }),
        }
    }
}

/// Model identifier per modality. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTarget {
    pub text: String,
    pub image: String,
    pub audio: String,
    pub document: String,
}

impl ModelTarget {
    pub fn model_for(&self, modality: Modality) -> &str {
        match modality {
            Modality::Text => &self.text,
            Modality::Image => &self.image,
            Modality::Audio => &self.audio,
            Modality::Document => &self.document,
        }
    }
}

impl Default for ModelTarget {
    fn default() -> Self {
        Self {
            text: "gemini-2.5-flash-lite".to_string(),
            image: "gemini-2.5-flash".to_string(),
            audio: "gemini-2.5-flash-lite".to_string(),
            document: "gemini-2.5-flash-lite".to_string(),
        }
    }
}
