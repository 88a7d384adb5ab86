use crate::models::ModelTarget;
use crate::services::providers::gemini::{GeminiConfig, GEMINI_API_BASE};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Default upload ceiling (20MB) for multipart media routes.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default timeout for completion API calls.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub models: ModelConfig,
    pub google: GoogleConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub text_model: String,
    pub image_model: String,
    pub audio_model: String,
    pub document_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub api_key: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub max_upload_bytes: usize,
    /// `*` allows any origin.
    pub cors_allowed_origins: Vec<String>,
    pub otlp_endpoint: Option<String>,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";
        let defaults = ModelTarget::default();

        let api_key = match env::var("GOOGLE_API_KEY").or_else(|_| env::var("GEMINI_API_KEY")) {
            Ok(key) => key,
            Err(_) => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "GOOGLE_API_KEY (or GEMINI_API_KEY) is required but not set"
                )))
            }
        };

        Ok(GatewayConfig {
            common: common_config,
            models: ModelConfig {
                text_model: get_env(
                    "GENAI_TEXT_MODEL",
                    Some(defaults.text.as_str()),
                    is_prod,
                )?,
                image_model: get_env(
                    "GENAI_IMAGE_MODEL",
                    Some(defaults.image.as_str()),
                    is_prod,
                )?,
                audio_model: get_env(
                    "GENAI_AUDIO_MODEL",
                    Some(defaults.audio.as_str()),
                    is_prod,
                )?,
                document_model: get_env(
                    "GENAI_DOCUMENT_MODEL",
                    Some(defaults.document.as_str()),
                    is_prod,
                )?,
            },
            google: GoogleConfig {
                api_key,
                api_base: get_env("GEMINI_API_BASE", Some(GEMINI_API_BASE), is_prod)?,
                request_timeout_secs: parse_timeout_secs(&get_env(
                    "GENAI_REQUEST_TIMEOUT_SECS",
                    Some(&DEFAULT_REQUEST_TIMEOUT_SECS.to_string()),
                    is_prod,
                )?)?,
            },
            server: ServerConfig {
                max_upload_bytes: get_env(
                    "GENAI_MAX_UPLOAD_BYTES",
                    Some(&DEFAULT_MAX_UPLOAD_BYTES.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
                cors_allowed_origins: parse_origins(&get_env(
                    "CORS_ALLOWED_ORIGINS",
                    Some("*"),
                    is_prod,
                )?),
                otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
            },
        })
    }

    /// Modality to model-id mapping handed to the dispatcher.
    pub fn model_target(&self) -> ModelTarget {
        ModelTarget {
            text: self.models.text_model.clone(),
            image: self.models.image_model.clone(),
            audio: self.models.audio_model.clone(),
            document: self.models.document_model.clone(),
        }
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.google.api_key.clone(),
            api_base: self.google.api_base.clone(),
            timeout: Duration::from_secs(self.google.request_timeout_secs),
        }
    }
}

/// A zero timeout would fail every completion call, so it is rejected.
fn parse_timeout_secs(raw: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(AppError::ConfigError(anyhow::anyhow!(
            "GENAI_REQUEST_TIMEOUT_SECS must be greater than zero"
        ))),
        Ok(secs) => Ok(secs),
        Err(e) => Err(AppError::ConfigError(anyhow::anyhow!(
            "GENAI_REQUEST_TIMEOUT_SECS is not a number of seconds ({:?}): {}",
            raw,
            e
        ))),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
