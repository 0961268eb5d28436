use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::api::ChatApi;
use crate::chat::feed::ChatFeed;
use crate::core::error::ClientError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Refreshes a chat feed from the chat endpoint on a fixed interval
pub struct ChatPoller<C> {
    client: Arc<C>,
    feed: ChatFeed,
    interval: Duration,
    limit: u32,
}

impl<C: ChatApi> ChatPoller<C> {
    pub fn new(client: Arc<C>, feed: ChatFeed, interval: Duration, limit: u32) -> Self {
        Self {
            client,
            feed,
            interval,
            limit,
        }
    }

    /// Fetch one window and show it. On failure the feed is left as is.
    pub async fn poll_once(&self) -> Result<usize, ClientError> {
        let window = self.client.fetch_recent(self.limit).await?;
        Ok(self.feed.replace(window))
    }

    /// Spawn the polling task. The first fetch happens right away.
    pub fn start(self) -> PollHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {}
                }

                tokio::select! {
                    _ = &mut stop_rx => break,
                    result = self.poll_once() => match result {
                        Ok(count) => debug!(messages = count, "Chat feed refreshed"),
                        Err(e) => warn!(error = %e, "Failed to load chat messages"),
                    },
                }
            }

            debug!("Chat poller stopped");
        });

        PollHandle {
            stop: Some(stop_tx),
            task: Some(task),
        }
    }
}

/// Running poll task. `stop` ends it and waits; dropping the handle aborts it.
pub struct PollHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            // the task may already be gone, nothing to signal then
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Chat poller task ended abnormally");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
