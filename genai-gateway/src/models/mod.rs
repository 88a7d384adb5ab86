//! Domain models for the gateway.

pub mod completion;
pub mod modality;

pub use completion::{CompletionResult, GenerateMediaResponse, GenerateTextResponse};
pub use modality::{default_instruction, MediaPayload, Modality, ModalityRequest, ModelTarget};
