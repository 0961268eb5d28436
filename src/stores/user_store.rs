use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use crate::models::user::User;

/// Server-side account record
#[derive(Clone, Debug)]
pub struct Account {
    pub user: User,
    /// Argon2 PHC string
    pub password_hash: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
}

/// In-memory accounts and issued session tokens
pub struct UserStore {
    accounts: DashMap<i64, Account>,
    tokens: DashMap<String, i64>,
    // the one live token of each user
    live_tokens: DashMap<i64, String>,
    next_id: AtomicI64,
    // username/email uniqueness spans two fields, so creation is serialized
    create_lock: Mutex<()>,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            tokens: DashMap::new(),
            live_tokens: DashMap::new(),
            next_id: AtomicI64::new(1),
            create_lock: Mutex::new(()),
        }
    }

    /// Whether the username or the email already belongs to an account
    pub fn is_taken(&self, username: &str, email: &str) -> bool {
        self.accounts
            .iter()
            .any(|entry| entry.user.username == username || entry.user.email == email)
    }

    /// Create an account. Returns `None` when the username or email is taken.
    pub fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: String,
        minecraft_nick: Option<&str>,
    ) -> Option<User> {
        let _guard = self.create_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.is_taken(username, email) {
            return None;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let user = User::new(id, username, email, minecraft_nick);
        self.accounts.insert(
            id,
            Account {
                user: user.clone(),
                password_hash,
                is_active: true,
                last_login: None,
            },
        );

        Some(user)
    }

    pub fn get(&self, id: i64) -> Option<Account> {
        self.accounts.get(&id).map(|entry| entry.value().clone())
    }

    /// Look up by username, falling back to email
    pub fn find_by_login(&self, login: &str) -> Option<Account> {
        self.accounts
            .iter()
            .find(|entry| entry.user.username == login || entry.user.email == login)
            .map(|entry| entry.value().clone())
    }

    pub fn record_login(&self, id: i64, at: DateTime<Utc>) {
        if let Some(mut account) = self.accounts.get_mut(&id) {
            account.last_login = Some(at);
        }
    }

    /// Returns false when there is no such account
    pub fn set_active(&self, id: i64, active: bool) -> bool {
        match self.accounts.get_mut(&id) {
            Some(mut account) => {
                account.is_active = active;
                true
            }
            None => false,
        }
    }

    /// Make `token` the user's session token. The token issued before it
    /// stops working.
    pub fn issue_token(&self, user_id: i64, token: String) -> String {
        self.tokens.insert(token.clone(), user_id);
        if let Some(previous) = self.live_tokens.insert(user_id, token.clone()) {
            if previous != token {
                self.tokens.remove(&previous);
            }
        }
        token
    }

    /// User behind a token, if the token is known and the account active
    pub fn user_for_token(&self, token: &str) -> Option<User> {
        let user_id = *self.tokens.get(token)?.value();
        self.get(user_id)
            .filter(|account| account.is_active)
            .map(|account| account.user)
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
