// HTTP clients for the auth, chat and status endpoints

pub mod auth_client;
pub mod chat_client;
pub mod status_client;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use crate::core::error::ClientError;
use crate::models::auth::AuthResult;
use crate::models::chat::ChatMessage;

/// Header carrying the session token on verify requests
pub const USER_TOKEN_HEADER: &str = "X-User-Token";
/// Header carrying the session token on chat posts
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

pub trait AuthApi: Send + Sync {
    fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        minecraft_nick: Option<&str>,
    ) -> impl Future<Output = Result<AuthResult, ClientError>> + Send;

    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthResult, ClientError>> + Send;

    fn verify(&self, token: &str) -> impl Future<Output = Result<AuthResult, ClientError>> + Send;
}

pub trait ChatApi: Send + Sync + 'static {
    /// Newest `limit` messages, oldest first
    fn fetch_recent(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, ClientError>> + Send;

    /// Post a message; resolves to the message the server created
    fn send(
        &self,
        body: &str,
        token: &str,
    ) -> impl Future<Output = Result<ChatMessage, ClientError>> + Send;
}

pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Turn a non-success response into a rejection, keeping the server's
/// `error` text when the body carries one
pub(crate) async fn rejection(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    match response.text().await {
        Ok(text) => rejection_from_body(status, &text),
        Err(_) => ClientError::Rejected {
            status: Some(status),
            message: None,
        },
    }
}

/// Rejection for a non-success status whose body was already read
pub(crate) fn rejection_from_body(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error);

    ClientError::Rejected {
        status: Some(status),
        message,
    }
}
