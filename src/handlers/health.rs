use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::core::state::AppState;
use crate::models::status::ServerStatus;
use crate::utils::time::current_timestamp;

#[derive(Debug, Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
}

/// Health check handler
///
/// GET /health
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp: current_timestamp(),
        }),
    )
}

/// Game server snapshot shown on the landing page
///
/// GET /status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<ServerStatus> {
    Json(ServerStatus::from(&state.config.status))
}
