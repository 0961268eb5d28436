use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::USER_TOKEN_HEADER;
use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::handlers::header_token;
use crate::models::auth::{AuthAction, AuthRequest, AuthResponse};
use crate::models::user::normalize_nick;
use crate::utils::auth::{generate_token, hash_password, verify_password};
use crate::validation::forms::validate_registration;

/// Auth endpoint
///
/// POST /auth with `{"action": "register" | "login" | "verify", ...}`.
/// Verify reads the token from the `X-User-Token` header.
pub async fn auth_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: AuthRequest = if body.is_empty() {
        AuthRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|_| ApiError::BadRequest("Invalid JSON".to_string()))?
    };

    match request.action {
        Some(AuthAction::Register) => register(&state, request).await,
        Some(AuthAction::Login) => login(&state, request).await,
        Some(AuthAction::Verify) => verify(&state, &headers),
        Some(AuthAction::Unknown) | None => Err(ApiError::BadRequest("Unknown action".to_string())),
    }
}

async fn register(state: &AppState, request: AuthRequest) -> Result<Response, ApiError> {
    let username = request.username.unwrap_or_default().trim().to_string();
    let email = request.email.unwrap_or_default().trim().to_string();
    let password = request.password.unwrap_or_default();
    let minecraft_nick = normalize_nick(request.minecraft_nick);

    validate_registration(&username, &email, &password)?;

    // Checked again on insert; this one only saves the hashing work
    if state.users.is_taken(&username, &email) {
        return Err(ApiError::Conflict);
    }

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    let user = state
        .users
        .create(&username, &email, password_hash, minecraft_nick.as_deref())
        .ok_or(ApiError::Conflict)?;
    let token = state.users.issue_token(user.id, generate_token());

    info!(user_id = user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            user: Some(user),
            token: Some(token),
            message: Some("User registered successfully".to_string()),
            error: None,
        }),
    )
        .into_response())
}

async fn login(state: &AppState, request: AuthRequest) -> Result<Response, ApiError> {
    let login = request.username.unwrap_or_default().trim().to_string();
    let password = request.password.unwrap_or_default();

    if login.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("Username and password required".to_string()));
    }

    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let account = state.users.find_by_login(&login).ok_or_else(|| {
        debug!(login = %login, "Login for unknown account");
        invalid()
    })?;

    let hash = account.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    if !matches {
        warn!(user_id = account.user.id, "Login with wrong password");
        return Err(invalid());
    }

    if !account.is_active {
        warn!(user_id = account.user.id, "Login to disabled account");
        return Err(ApiError::AccountDisabled);
    }

    state.users.record_login(account.user.id, Utc::now());
    let token = state.users.issue_token(account.user.id, generate_token());

    info!(user_id = account.user.id, username = %account.user.username, "User logged in");

    Ok(Json(AuthResponse {
        success: true,
        user: Some(account.user),
        token: Some(token),
        message: Some("Login successful".to_string()),
        error: None,
    })
    .into_response())
}

fn verify(state: &AppState, headers: &HeaderMap) -> Result<Response, ApiError> {
    let token = header_token(headers, USER_TOKEN_HEADER)
        .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

    let user = state
        .users
        .user_for_token(token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    debug!(user_id = user.id, "Token verified");

    Ok(Json(AuthResponse {
        success: true,
        user: Some(user),
        ..Default::default()
    })
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use axum::body::Body;
    use axum::http::HeaderValue;
    use http_body_util::BodyExt;

    fn create_test_state() -> Arc<AppState> {
        Arc::new(AppState::new(Config::default()))
    }

    async fn call(
        state: &Arc<AppState>,
        headers: HeaderMap,
        body: serde_json::Value,
    ) -> (StatusCode, AuthResponse) {
        let response = match auth_handler(
            State(Arc::clone(state)),
            headers,
            Bytes::from(body.to_string()),
        )
        .await
        {
            Ok(response) => response,
            Err(err) => err.into_response(),
        };

        let (parts, body) = response.into_parts();
        let bytes = Body::new(body).collect().await.unwrap().to_bytes();
        (parts.status, serde_json::from_slice(&bytes).unwrap())
    }

    fn register_body(username: &str, email: &str) -> serde_json::Value {
        serde_json::json!({
            "action": "register",
            "username": username,
            "email": email,
            "password": "secret1",
            "minecraft_nick": "Steve_MC"
        })
    }

    fn token_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-token", HeaderValue::from_str(token).unwrap());
        headers
    }

    #[tokio::test]
    async fn test_register_creates_account() {
        let state = create_test_state();
        let (status, body) = call(&state, HeaderMap::new(), register_body("steve", "s@example.org")).await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body.success);
        let user = body.user.unwrap();
        assert_eq!(user.username, "steve");
        assert_eq!(user.minecraft_nick.as_deref(), Some("Steve_MC"));
        assert_eq!(body.token.unwrap().len(), 64);
        assert_eq!(state.users.len(), 1);
    }

    #[tokio::test]
    async fn test_register_validation_messages() {
        let state = create_test_state();

        let (status, body) = call(&state, HeaderMap::new(), register_body("st", "s@example.org")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.as_deref(), Some("Username must be at least 3 characters"));

        let (_, body) = call(&state, HeaderMap::new(), register_body("steve", "nope")).await;
        assert_eq!(body.error.as_deref(), Some("Invalid email"));

        let short = serde_json::json!({
            "action": "register",
            "username": "steve",
            "email": "s@example.org",
            "password": "12345"
        });
        let (_, body) = call(&state, HeaderMap::new(), short).await;
        assert_eq!(body.error.as_deref(), Some("Password must be at least 6 characters"));
        assert!(state.users.is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let state = create_test_state();
        call(&state, HeaderMap::new(), register_body("steve", "s@example.org")).await;

        let (status, body) = call(&state, HeaderMap::new(), register_body("steve", "x@example.org")).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("Username or email already exists"));
    }

    #[tokio::test]
    async fn test_login_by_username_or_email() {
        let state = create_test_state();
        call(&state, HeaderMap::new(), register_body("steve", "s@example.org")).await;

        for login in ["steve", "s@example.org"] {
            let (status, body) = call(
                &state,
                HeaderMap::new(),
                serde_json::json!({"action": "login", "username": login, "password": "secret1"}),
            )
            .await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body.message.as_deref(), Some("Login successful"));
            assert_eq!(body.user.unwrap().username, "steve");
            assert!(body.token.is_some());
        }

        let account = state.users.find_by_login("steve").unwrap();
        assert!(account.last_login.is_some());
    }

    #[tokio::test]
    async fn test_login_failures() {
        let state = create_test_state();
        call(&state, HeaderMap::new(), register_body("steve", "s@example.org")).await;

        let (status, body) = call(
            &state,
            HeaderMap::new(),
            serde_json::json!({"action": "login", "username": "steve"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.as_deref(), Some("Username and password required"));

        let (status, body) = call(
            &state,
            HeaderMap::new(),
            serde_json::json!({"action": "login", "username": "steve", "password": "wrong!!"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error.as_deref(), Some("Invalid credentials"));

        let (status, _) = call(
            &state,
            HeaderMap::new(),
            serde_json::json!({"action": "login", "username": "nobody", "password": "secret1"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_retires_earlier_token() {
        let state = create_test_state();
        let (_, registered) = call(&state, HeaderMap::new(), register_body("steve", "s@example.org")).await;
        let first = registered.token.unwrap();

        let (_, logged_in) = call(
            &state,
            HeaderMap::new(),
            serde_json::json!({"action": "login", "username": "steve", "password": "secret1"}),
        )
        .await;
        let second = logged_in.token.unwrap();

        let (status, body) = call(&state, token_headers(&first), serde_json::json!({"action": "verify"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error.as_deref(), Some("Invalid token"));

        let (status, _) = call(&state, token_headers(&second), serde_json::json!({"action": "verify"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.users.token_count(), 1);
    }

    #[tokio::test]
    async fn test_login_disabled_account() {
        let state = create_test_state();
        let (_, body) = call(&state, HeaderMap::new(), register_body("steve", "s@example.org")).await;
        state.users.set_active(body.user.unwrap().id, false);

        let (status, body) = call(
            &state,
            HeaderMap::new(),
            serde_json::json!({"action": "login", "username": "steve", "password": "secret1"}),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.error.as_deref(), Some("Account is disabled"));
    }

    #[tokio::test]
    async fn test_verify_token() {
        let state = create_test_state();
        let (_, registered) = call(&state, HeaderMap::new(), register_body("steve", "s@example.org")).await;
        let token = registered.token.unwrap();

        let (status, body) = call(
            &state,
            token_headers(&token),
            serde_json::json!({"action": "verify"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.user, registered.user);
        assert!(body.token.is_none());
    }

    #[tokio::test]
    async fn test_verify_failures() {
        let state = create_test_state();

        let (status, body) = call(&state, HeaderMap::new(), serde_json::json!({"action": "verify"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error.as_deref(), Some("No token provided"));

        let (status, body) = call(
            &state,
            token_headers("deadbeef"),
            serde_json::json!({"action": "verify"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error.as_deref(), Some("Invalid token"));
    }

    #[tokio::test]
    async fn test_unknown_action_and_bad_json() {
        let state = create_test_state();

        let (status, body) = call(&state, HeaderMap::new(), serde_json::json!({"action": "reset"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.as_deref(), Some("Unknown action"));

        let (_, body) = call(&state, HeaderMap::new(), serde_json::json!({})).await;
        assert_eq!(body.error.as_deref(), Some("Unknown action"));

        let response = auth_handler(State(Arc::clone(&state)), HeaderMap::new(), Bytes::from("{nope"))
            .await
            .unwrap_err()
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
