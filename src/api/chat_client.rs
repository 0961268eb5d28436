use anyhow::Result;
use std::time::Duration;
use tracing::debug;

use crate::api::{build_http_client, rejection, ChatApi, AUTH_TOKEN_HEADER};
use crate::core::error::ClientError;
use crate::models::chat::{ChatMessage, MessagePayload, MessagesResponse, SendMessageRequest};

pub const DEFAULT_FETCH_LIMIT: u32 = 50;

/// Client for the chat endpoint
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ChatApi for ChatClient {
    async fn fetch_recent(&self, limit: u32) -> Result<Vec<ChatMessage>, ClientError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("limit", limit)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body = response.json::<MessagesResponse>().await?;
        debug!(limit, fetched = body.messages.len(), "Chat window fetched");

        Ok(body.messages.into_iter().map(ChatMessage::from).collect())
    }

    async fn send(&self, body: &str, token: &str) -> Result<ChatMessage, ClientError> {
        let request = SendMessageRequest {
            message: body.to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTH_TOKEN_HEADER, token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let created = response.json::<MessagePayload>().await?;
        debug!(message_id = created.id, "Chat message created");

        Ok(created.into())
    }
}
