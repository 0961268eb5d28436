use axum::response::{IntoResponse, Response};
use crate::core::error::ApiError;

pub async fn fallback_handler() -> Response {
    ApiError::NotFound(
        "Invalid endpoint. Valid endpoints: /auth, /chat, /status, /health".to_string(),
    )
    .into_response()
}
