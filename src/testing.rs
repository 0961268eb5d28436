// In-process stand-ins for the remote endpoints, shared by unit tests

use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::routing::any;
use axum::Router;
use chrono::{TimeZone, Utc};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::net::TcpListener;

use crate::api::{AuthApi, ChatApi};
use crate::core::error::ClientError;
use crate::models::auth::AuthResult;
use crate::models::chat::ChatMessage;
use crate::models::user::User;

pub fn sample_user() -> User {
    User::new(42, "steve", "steve@example.org", Some("Steve_MC"))
}

pub fn message(id: i64, author: &str, body: &str) -> ChatMessage {
    ChatMessage {
        id,
        author: author.to_string(),
        body: body.to_string(),
        timestamp: Utc.timestamp_opt(1_714_557_600 + id, 0).unwrap(),
    }
}

#[derive(Debug, Clone)]
pub enum FakeReply {
    Accept { user: User, token: String },
    Reject(&'static str),
    Unreachable,
}

/// Auth endpoint double that answers every call with the same reply
pub struct FakeAuth {
    reply: FakeReply,
    calls: AtomicUsize,
    verified_tokens: Mutex<Vec<String>>,
}

impl FakeAuth {
    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            verified_tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn accepting(user: User, token: &str) -> Self {
        Self::new(FakeReply::Accept {
            user,
            token: token.to_string(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn verified_tokens(&self) -> Vec<String> {
        self.verified_tokens.lock().unwrap().clone()
    }

    fn answer(&self, with_token: bool) -> Result<AuthResult, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            FakeReply::Accept { user, token } => Ok(AuthResult::Authenticated {
                user: user.clone(),
                token: with_token.then(|| token.clone()),
            }),
            FakeReply::Reject(error) => Ok(AuthResult::Rejected {
                error: Some(error.to_string()),
            }),
            FakeReply::Unreachable => Err(ClientError::Transport("connection refused".into())),
        }
    }
}

impl AuthApi for FakeAuth {
    async fn register(
        &self,
        _username: &str,
        _email: &str,
        _password: &str,
        _minecraft_nick: Option<&str>,
    ) -> Result<AuthResult, ClientError> {
        self.answer(true)
    }

    async fn login(&self, _username: &str, _password: &str) -> Result<AuthResult, ClientError> {
        self.answer(true)
    }

    async fn verify(&self, token: &str) -> Result<AuthResult, ClientError> {
        self.verified_tokens.lock().unwrap().push(token.to_string());
        self.answer(false)
    }
}

/// Chat endpoint double with a scripted window and server-side id counter
pub struct FakeChat {
    window: Mutex<Vec<ChatMessage>>,
    next_id: AtomicI64,
    fetches: AtomicUsize,
    sends: AtomicUsize,
    fail_fetch: bool,
}

impl FakeChat {
    pub fn new(window: Vec<ChatMessage>) -> Self {
        let next_id = window.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        Self {
            window: Mutex::new(window),
            next_id: AtomicI64::new(next_id),
            fetches: AtomicUsize::new(0),
            sends: AtomicUsize::new(0),
            fail_fetch: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_fetch: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn set_window(&self, window: Vec<ChatMessage>) {
        *self.window.lock().unwrap() = window;
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

impl ChatApi for FakeChat {
    async fn fetch_recent(&self, limit: u32) -> Result<Vec<ChatMessage>, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch {
            return Err(ClientError::Transport("timed out".into()));
        }
        let window = self.window.lock().unwrap();
        let skip = window.len().saturating_sub(limit as usize);
        Ok(window[skip..].to_vec())
    }

    async fn send(&self, body: &str, _token: &str) -> Result<ChatMessage, ClientError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(message(id, "Steve_MC", body))
    }
}

/// Serve `body` with `status` for every request to `path`; returns the base URL
pub async fn stub_server(path: &str, status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route(
        path,
        any(move || async move { (status, [(CONTENT_TYPE, "application/json")], body) }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Accepts connections and never answers
pub async fn silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}
