//! Gemini completion client.
//!
//! Calls `models/{model}:generateContent` on Google's Generative Language API
//! and hands back the response body untouched.

use super::{CompletionClient, CompletionRequest, Contents, Part, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    pub timeout: Duration,
}

/// Gemini completion client.
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Build the API URL for the given model and method.
    fn api_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            model,
            method
        )
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn generate(&self, request: &CompletionRequest) -> Result<Value, ProviderError> {
        let body = GenerateContentRequest::from(request);
        let url = self.api_url(&request.model, "generateContent");

        tracing::debug!(
            model = %request.model,
            part_count = body.contents.first().map(|c| c.parts.len()).unwrap_or(0),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        // Listing models verifies both reachability and the key
        let url = format!("{}/models", self.config.api_base.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }
}

// ============================================================================
// Gemini API Request Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    role: &'static str,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl From<&Part> for ContentPart {
    fn from(part: &Part) -> Self {
        match part {
            Part::Text { text } => ContentPart::Text { text: text.clone() },
            Part::InlineData { mime_type, data } => ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                },
            },
        }
    }
}

impl From<&CompletionRequest> for GenerateContentRequest {
    fn from(request: &CompletionRequest) -> Self {
        let parts = match &request.contents {
            Contents::Text(text) => vec![ContentPart::Text { text: text.clone() }],
            Contents::Parts(parts) => parts.iter().map(ContentPart::from).collect(),
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(api_base: &str) -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            api_key: "test-key".to_string(),
            api_base: api_base.to_string(),
            timeout: Duration::from_secs(5),
        })
        .expect("client should build")
    }

    #[test]
    fn api_url_targets_model_method() {
        let client = client("https://example.test/v1beta/");
        assert_eq!(
            client.api_url("gemini-2.5-flash", "generateContent"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn text_contents_become_single_user_part() {
        let request = CompletionRequest {
            model: "gemini-2.5-flash-lite".to_string(),
            contents: Contents::Text("Hai Gemini".to_string()),
        };

        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({"contents": [{"role": "user", "parts": [{"text": "Hai Gemini"}]}]})
        );
    }

    #[test]
    fn inline_media_serializes_in_camel_case() {
        let request = CompletionRequest {
            model: "gemini-2.5-flash".to_string(),
            contents: Contents::Parts(vec![
                Part::Text {
                    text: "Describe this".to_string(),
                },
                Part::InlineData {
                    mime_type: "image/png".to_string(),
                    data: "AQID".to_string(),
                },
            ]),
        };

        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();
        assert_eq!(
            body["contents"][0]["parts"],
            json!([
                {"text": "Describe this"},
                {"inlineData": {"mimeType": "image/png", "data": "AQID"}}
            ])
        );
    }

    /// Serve `status` with `body` for every generateContent call.
    async fn spawn_stub(status: u16, body: &'static str) -> String {
        use axum::{http::StatusCode, routing::post, Router};

        let status = StatusCode::from_u16(status).unwrap();
        let app = Router::new().route(
            "/models/:method",
            post(move || async move { (status, body) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        format!("http://{}", addr)
    }

    fn text_request() -> CompletionRequest {
        CompletionRequest {
            model: "gemini-2.5-flash-lite".to_string(),
            contents: Contents::Text("hi".to_string()),
        }
    }

    #[tokio::test]
    async fn quota_error_keeps_upstream_body() {
        let base = spawn_stub(429, "RESOURCE_EXHAUSTED: quota exceeded").await;

        let err = client(&base).generate(&text_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::ApiError(_)));
        assert_eq!(
            err.to_string(),
            "API error: Gemini API error 429 Too Many Requests: RESOURCE_EXHAUSTED: quota exceeded"
        );
    }

    #[tokio::test]
    async fn server_error_reports_status_and_body() {
        let base = spawn_stub(503, "backend unavailable").await;

        let err = client(&base).generate(&text_request()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "API error: Gemini API error 503 Service Unavailable: backend unavailable"
        );
    }

    #[tokio::test]
    async fn success_returns_raw_body() {
        let base = spawn_stub(
            200,
            r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#,
        )
        .await;

        let response = client(&base).generate(&text_request()).await.unwrap();
        assert_eq!(response["candidates"][0]["content"]["parts"][0]["text"], "ok");
    }

    #[tokio::test]
    async fn unreachable_api_is_a_network_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let client = client("http://127.0.0.1:9");
        let request = CompletionRequest {
            model: "m".to_string(),
            contents: Contents::Text("hi".to_string()),
        };

        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, ProviderError::NetworkError(_)));
    }
}
