use genai_gateway::config::{GatewayConfig, GoogleConfig, ModelConfig, ServerConfig};
use genai_gateway::services::providers::mock::MockCompletionClient;
use genai_gateway::startup::{build_router, AppState};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub const BOUNDARY: &str = "gateway-test-boundary";

pub const TEXT_MODEL: &str = "test-text-model";
pub const IMAGE_MODEL: &str = "test-image-model";
pub const AUDIO_MODEL: &str = "test-audio-model";
pub const DOCUMENT_MODEL: &str = "test-document-model";

pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            log_level: "debug".to_string(),
        },
        models: ModelConfig {
            text_model: TEXT_MODEL.to_string(),
            image_model: IMAGE_MODEL.to_string(),
            audio_model: AUDIO_MODEL.to_string(),
            document_model: DOCUMENT_MODEL.to_string(),
        },
        google: GoogleConfig {
            api_key: "test-api-key".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 5,
        },
        server: ServerConfig {
            max_upload_bytes: 1024 * 1024,
            cors_allowed_origins: vec!["*".to_string()],
            otlp_endpoint: None,
        },
    }
}

pub fn router_with(client: Arc<MockCompletionClient>) -> axum::Router {
    build_router(AppState::new(test_config(), client))
}

/// A multipart field: (name, optional (filename, content type), bytes).
pub struct FormField<'a> {
    pub name: &'a str,
    pub file: Option<(&'a str, &'a str)>,
    pub data: &'a [u8],
}

pub fn multipart_body(fields: &[FormField<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for field in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match field.file {
            Some((filename, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        field.name, filename, content_type
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        field.name
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(field.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
