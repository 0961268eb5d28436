use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::api::ChatApi;
use crate::chat::feed::ChatFeed;
use crate::chat::poller::{ChatPoller, PollHandle};
use crate::core::error::ClientError;
use crate::models::chat::ChatMessage;
use crate::session::controller::Session;
use crate::validation::forms::validate_message;

/// The chat widget: one feed, fed by polling and by the user's own sends
pub struct ChatRoom<C> {
    client: Arc<C>,
    feed: ChatFeed,
}

impl<C: ChatApi> ChatRoom<C> {
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
            feed: ChatFeed::new(),
        }
    }

    pub fn feed(&self) -> &ChatFeed {
        &self.feed
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn poller(&self, interval: Duration, limit: u32) -> ChatPoller<C> {
        ChatPoller::new(Arc::clone(&self.client), self.feed.clone(), interval, limit)
    }

    pub fn start_polling(&self, interval: Duration, limit: u32) -> PollHandle {
        self.poller(interval, limit).start()
    }

    /// Post `body` as the signed-in user and show the server's copy at once.
    /// Without a session nothing is sent.
    pub async fn send(&self, session: Option<&Session>, body: &str) -> Result<ChatMessage, ClientError> {
        let session = session.ok_or(ClientError::AuthRequired)?;
        validate_message(body)?;

        let message = self.client.send(body, &session.token).await?;
        if !self.feed.append(message.clone()) {
            debug!(message_id = message.id, "Sent message already shown by a poll");
        }

        Ok(message)
    }
}
