use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use super::{ApiError, AppState};

/// GET /health
///
/// `ok` while the database answers, 503 otherwise.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store().ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("The requested page does not exist.".to_string())
}
