use crate::core::error::StoreError;
use crate::models::user::User;
use crate::stores::kv_store::KeyValueStore;
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "user";

/// Result of reading the cached user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredUser {
    Absent,
    Present(User),
    /// Something is stored under the key but it is not a user record
    Malformed(String),
}

/// Persisted bearer token and cached user profile
pub struct SessionStore {
    backend: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn save_token(&self, token: &str) -> Result<(), StoreError> {
        self.backend.set(TOKEN_KEY, token)
    }

    pub fn token(&self) -> Option<String> {
        self.backend.get(TOKEN_KEY).filter(|token| !token.is_empty())
    }

    pub fn remove_token(&self) -> Result<(), StoreError> {
        self.backend.remove(TOKEN_KEY)
    }

    pub fn save_user(&self, user: &User) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(user)?;
        self.backend.set(USER_KEY, &serialized)
    }

    pub fn load_user(&self) -> StoredUser {
        match self.backend.get(USER_KEY) {
            None => StoredUser::Absent,
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => StoredUser::Present(user),
                Err(e) => StoredUser::Malformed(e.to_string()),
            },
        }
    }

    /// Cached user, or `None` when absent or unreadable
    pub fn user(&self) -> Option<User> {
        match self.load_user() {
            StoredUser::Present(user) => Some(user),
            StoredUser::Absent => None,
            StoredUser::Malformed(reason) => {
                warn!(error = %reason, "Cached user is malformed, ignoring it");
                None
            }
        }
    }

    pub fn remove_user(&self) -> Result<(), StoreError> {
        self.backend.remove(USER_KEY)
    }

    /// Forget token and user. Safe to call when nothing is stored.
    pub fn logout(&self) -> Result<(), StoreError> {
        let token = self.remove_token();
        let user = self.remove_user();
        debug!("Session store cleared");
        token.and(user)
    }

    /// Store both halves of a new session
    pub fn save_session(&self, token: &str, user: &User) -> Result<(), StoreError> {
        self.save_token(token)?;
        self.save_user(user)
    }
}
