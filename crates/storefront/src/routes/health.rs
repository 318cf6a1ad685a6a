//! Health check endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::warn;

use crate::state::AppState;

/// Liveness check: the process is up and serving.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness check: the storefront can reach the commerce backend.
///
/// Returns 503 while the backend is unreachable so load balancers hold
/// traffic instead of serving pages that cannot render.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.commerce().health().await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok", "backend": "ok"}))),
        Err(error) => {
            warn!(error = %error, "Readiness check failed: commerce backend unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "fail", "backend": "unreachable"})),
            )
        }
    }
}
