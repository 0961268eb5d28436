use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::{deserialize_nick, User};
use crate::utils::time::deserialize_timestamp;

/// Message object as sent over the chat endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub id: i64,
    pub username: String,
    #[serde(default, deserialize_with = "deserialize_nick")]
    pub minecraft_nick: Option<String>,
    pub message: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl MessagePayload {
    pub fn new(id: i64, author: &User, message: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            username: author.username.clone(),
            minecraft_nick: author.minecraft_nick.clone(),
            message: message.to_string(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessagePayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    pub limit: Option<u32>,
}

/// A chat line as the client shows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: i64,
    /// Nickname when the author has one, otherwise the username
    pub author: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

impl From<MessagePayload> for ChatMessage {
    fn from(payload: MessagePayload) -> Self {
        let author = payload.minecraft_nick.unwrap_or(payload.username);
        Self {
            id: payload.id,
            author,
            body: payload.message,
            timestamp: payload.timestamp,
        }
    }
}

impl ChatMessage {
    /// Local wall-clock time as HH:MM
    pub fn time_label(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.time_label(), self.author, self.body)
    }
}
