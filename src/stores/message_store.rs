use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

#[derive(Clone, Debug)]
pub struct StoredMessage {
    pub id: i64,
    pub user_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Chat history, oldest first, bounded to `capacity` messages
pub struct MessageStore {
    messages: RwLock<VecDeque<StoredMessage>>,
    next_id: AtomicI64,
    capacity: usize,
}

impl MessageStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: RwLock::new(VecDeque::new()),
            next_id: AtomicI64::new(1),
            capacity,
        }
    }

    /// Append a message stamped now; the oldest one goes when full
    pub fn push(&self, user_id: i64, body: &str) -> StoredMessage {
        let mut messages = self.messages.write().unwrap_or_else(|poisoned| poisoned.into_inner());

        // id and position are assigned under the same lock so ids stay ordered
        let message = StoredMessage {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id,
            body: body.to_string(),
            created_at: Utc::now(),
        };

        messages.push_back(message.clone());
        while messages.len() > self.capacity {
            messages.pop_front();
        }

        message
    }

    /// The newest `limit` messages, oldest first
    pub fn recent(&self, limit: usize) -> Vec<StoredMessage> {
        let messages = self.messages.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let skip = messages.len().saturating_sub(limit);
        messages.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.read().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
