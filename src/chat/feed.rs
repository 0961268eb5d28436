use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

use crate::models::chat::ChatMessage;

/// Ordered list of chat messages on screen.
///
/// Poll ticks replace the whole list and sends append to it; both go
/// through the one watch sender, which serializes them.
#[derive(Clone)]
pub struct ChatFeed {
    messages: Arc<watch::Sender<Vec<ChatMessage>>>,
}

impl ChatFeed {
    pub fn new() -> Self {
        let (messages, _) = watch::channel(Vec::new());
        Self {
            messages: Arc::new(messages),
        }
    }

    /// Show exactly `window`, in the order given, minus repeated ids.
    /// Anything not in the window disappears. Returns the new length.
    pub fn replace(&self, window: Vec<ChatMessage>) -> usize {
        let mut seen = HashSet::with_capacity(window.len());
        let window: Vec<ChatMessage> = window
            .into_iter()
            .filter(|message| seen.insert(message.id))
            .collect();
        let len = window.len();
        self.messages.send_replace(window);
        len
    }

    /// Add a message at the end unless one with the same id is already shown
    pub fn append(&self, message: ChatMessage) -> bool {
        self.messages.send_if_modified(|messages| {
            if messages.iter().any(|m| m.id == message.id) {
                return false;
            }
            messages.push(message);
            true
        })
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }

    /// Receiver that wakes on every change
    pub fn subscribe(&self) -> watch::Receiver<Vec<ChatMessage>> {
        self.messages.subscribe()
    }
}

impl Default for ChatFeed {
    fn default() -> Self {
        Self::new()
    }
}
