use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::chat_client::DEFAULT_FETCH_LIMIT;
use crate::api::AUTH_TOKEN_HEADER;
use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::handlers::header_token;
use crate::models::chat::{FetchQuery, MessagePayload, MessagesResponse, SendMessageRequest};
use crate::validation::forms::validate_message;

/// GET /chat?limit=N
///
/// Newest `limit` messages in chronological order. The limit is capped by
/// `server.max_fetch_limit`.
pub async fn fetch_messages_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FetchQuery>, QueryRejection>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let Query(query) = query.map_err(|_| ApiError::BadRequest("Invalid limit".to_string()))?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_FETCH_LIMIT)
        .min(state.config.server.max_fetch_limit);

    let messages: Vec<MessagePayload> = state
        .messages
        .recent(limit as usize)
        .into_iter()
        .filter_map(|message| {
            let author = state.users.get(message.user_id)?;
            Some(MessagePayload::new(
                message.id,
                &author.user,
                &message.body,
                message.created_at,
            ))
        })
        .collect();

    debug!(limit, returned = messages.len(), "Messages fetched");

    Ok(Json(MessagesResponse { messages }))
}

/// POST /chat with `X-Auth-Token` and `{"message": "..."}`
pub async fn send_message_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let token = header_token(&headers, AUTH_TOKEN_HEADER)
        .ok_or_else(|| ApiError::Unauthorized("Authorization required".to_string()))?;

    let user = state
        .users
        .user_for_token(token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    let request: SendMessageRequest = if body.is_empty() {
        SendMessageRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|_| ApiError::BadRequest("Invalid JSON".to_string()))?
    };

    let text = validate_message(&request.message)?;
    let stored = state.messages.push(user.id, text);

    info!(message_id = stored.id, user_id = user.id, "Message posted");

    Ok((
        StatusCode::CREATED,
        Json(MessagePayload::new(stored.id, &user, &stored.body, stored.created_at)),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use axum::body::Body;
    use axum::http::HeaderValue;
    use http_body_util::BodyExt;

    fn create_test_state() -> (Arc<AppState>, String) {
        let state = Arc::new(AppState::new(Config::default()));
        let user = state
            .users
            .create("steve", "s@example.org", "hash".to_string(), Some("Steve_MC"))
            .unwrap();
        let token = state.users.issue_token(user.id, "token-1".to_string());
        (state, token)
    }

    fn auth_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-auth-token", HeaderValue::from_str(token).unwrap());
        headers
    }

    async fn send(state: &Arc<AppState>, headers: HeaderMap, message: &str) -> Response {
        let body = Bytes::from(serde_json::json!({ "message": message }).to_string());
        match send_message_handler(State(Arc::clone(state)), headers, body).await {
            Ok(response) => response,
            Err(err) => err.into_response(),
        }
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = Body::new(response.into_body()).collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn fetch(state: &Arc<AppState>, limit: Option<u32>) -> Vec<MessagePayload> {
        let Json(response) = fetch_messages_handler(
            State(Arc::clone(state)),
            Ok(Query(FetchQuery { limit })),
        )
        .await
        .unwrap();
        response.messages
    }

    #[tokio::test]
    async fn test_send_message() {
        let (state, token) = create_test_state();

        let response = send(&state, auth_headers(&token), "  hello  ").await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["message"], "hello");
        assert_eq!(body["username"], "steve");
        assert_eq!(body["minecraft_nick"], "Steve_MC");
        assert_eq!(state.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_send_requires_valid_token() {
        let (state, _) = create_test_state();

        let response = send(&state, HeaderMap::new(), "hello").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(response).await["error"], "Authorization required");

        let response = send(&state, auth_headers("forged"), "hello").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(response).await["error"], "Invalid token");

        assert!(state.messages.is_empty());
    }

    #[tokio::test]
    async fn test_send_rejects_bad_bodies() {
        let (state, token) = create_test_state();

        let response = send(&state, auth_headers(&token), "   ").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "Message cannot be empty");

        let response = send(&state, auth_headers(&token), &"a".repeat(501)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["error"], "Message too long (max 500 characters)");

        let response = send(&state, auth_headers(&token), &"a".repeat(500)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let err = send_message_handler(State(Arc::clone(&state)), auth_headers(&token), Bytes::from("not json"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON");
    }

    #[tokio::test]
    async fn test_fetch_window_is_chronological() {
        let (state, token) = create_test_state();
        for i in 0..5 {
            send(&state, auth_headers(&token), &format!("msg {}", i)).await;
        }

        let messages = fetch(&state, Some(3)).await;
        let ids: Vec<i64> = messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
        assert_eq!(messages[2].message, "msg 4");

        assert_eq!(fetch(&state, None).await.len(), 5);
    }

    #[tokio::test]
    async fn test_fetch_limit_is_capped() {
        let mut config = Config::default();
        config.server.max_fetch_limit = 2;
        let state = Arc::new(AppState::new(config));
        let user = state
            .users
            .create("steve", "s@example.org", "hash".to_string(), None)
            .unwrap();
        for i in 0..4 {
            state.messages.push(user.id, &format!("msg {}", i));
        }

        assert_eq!(fetch(&state, Some(100)).await.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_empty_history() {
        let (state, _) = create_test_state();
        assert!(fetch(&state, Some(50)).await.is_empty());
    }
}
