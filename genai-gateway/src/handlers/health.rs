use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "genai-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: the completion API must accept our credentials.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.client.health_check().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Completion API not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
