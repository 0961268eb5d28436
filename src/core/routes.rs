// HTTP routes configuration

use crate::core::state::AppState;
use crate::handlers::{auth, chat, fallback, health};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth", post(auth::auth_handler))
        .route(
            "/chat",
            get(chat::fetch_messages_handler).post(chat::send_message_handler),
        )
        .route("/status", get(health::status_handler))
        .route("/health", get(health::health_handler))

        // 404 fallback for all unmatched routes
        .fallback(fallback::fallback_handler)

        // Browser clients call from other origins and send preflights
        .layer(CorsLayer::permissive())
        .with_state(state)
}
