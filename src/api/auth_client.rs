use anyhow::Result;
use std::time::Duration;
use tracing::debug;

use crate::api::{build_http_client, rejection_from_body, AuthApi, USER_TOKEN_HEADER};
use crate::core::error::ClientError;
use crate::models::auth::{AuthRequest, AuthResponse, AuthResult};

/// Client for the auth endpoint. Every action is a POST to the same URL.
pub struct AuthClient {
    client: reqwest::Client,
    endpoint: String,
}

impl AuthClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The backend answers rejections with a `success:false` body and a 4xx
    /// status, so the body is read whatever the status. A non-success answer
    /// in some other shape is still a rejection; only a failed exchange or a
    /// success status with an unreadable body is a transport failure.
    async fn post(&self, request: &AuthRequest, token: Option<&str>) -> Result<AuthResult, ClientError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(token) = token {
            builder = builder.header(USER_TOKEN_HEADER, token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let body = match serde_json::from_str::<AuthResponse>(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                debug!(
                    action = ?request.action,
                    status = status.as_u16(),
                    "Auth endpoint refused the request"
                );
                return Err(rejection_from_body(status.as_u16(), &text));
            }
            Err(e) => return Err(ClientError::Transport(Box::new(e))),
        };

        debug!(
            action = ?request.action,
            status = status.as_u16(),
            success = body.success,
            "Auth response received"
        );

        Ok(body.into())
    }
}

impl AuthApi for AuthClient {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        minecraft_nick: Option<&str>,
    ) -> Result<AuthResult, ClientError> {
        let request = AuthRequest::register(username, email, password, minecraft_nick);
        self.post(&request, None).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<AuthResult, ClientError> {
        self.post(&AuthRequest::login(username, password), None).await
    }

    async fn verify(&self, token: &str) -> Result<AuthResult, ClientError> {
        self.post(&AuthRequest::verify(), Some(token)).await
    }
}
