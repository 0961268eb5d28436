// Application state (AppState)

use crate::core::config::Config;
use crate::stores::{message_store::MessageStore, user_store::UserStore};
use std::sync::Arc;

/// Shared state of the reference backend
#[derive(Clone)]
pub struct AppState {
    /// Accounts and issued tokens
    pub users: Arc<UserStore>,

    /// Chat history
    pub messages: Arc<MessageStore>,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        Self {
            users: Arc::new(UserStore::new()),
            messages: Arc::new(MessageStore::new(config.server.max_messages)),
            config,
        }
    }
}
