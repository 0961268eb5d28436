use anyhow::Result;
use std::time::Duration;
use tracing::warn;

use crate::api::{build_http_client, rejection};
use crate::core::error::ClientError;
use crate::models::status::ServerStatus;

pub struct StatusClient {
    client: reqwest::Client,
    endpoint: String,
}

impl StatusClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout)?,
            endpoint,
        })
    }

    pub async fn fetch(&self) -> Result<ServerStatus, ClientError> {
        let response = self.client.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        Ok(response.json::<ServerStatus>().await?)
    }
}

/// Last known server status; a failed refresh keeps the previous value
#[derive(Debug, Default)]
pub struct StatusBoard {
    last: Option<ServerStatus>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<ServerStatus> {
        self.last
    }

    pub fn apply(&mut self, result: Result<ServerStatus, ClientError>) -> Option<ServerStatus> {
        match result {
            Ok(status) => self.last = Some(status),
            Err(e) => warn!(error = %e, "Failed to refresh server status"),
        }
        self.last
    }

    pub async fn refresh(&mut self, client: &StatusClient) -> Option<ServerStatus> {
        let result = client.fetch().await;
        self.apply(result)
    }
}
