use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Discriminator carried in the body of every auth request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthAction {
    Register,
    Login,
    Verify,
    #[serde(other)]
    Unknown,
}

/// Body of a request to the auth endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub action: Option<AuthAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minecraft_nick: Option<String>,
}

impl AuthRequest {
    pub fn register(username: &str, email: &str, password: &str, minecraft_nick: Option<&str>) -> Self {
        Self {
            action: Some(AuthAction::Register),
            username: Some(username.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            minecraft_nick: minecraft_nick.map(str::to_string),
        }
    }

    pub fn login(username: &str, password: &str) -> Self {
        Self {
            action: Some(AuthAction::Login),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            ..Default::default()
        }
    }

    pub fn verify() -> Self {
        Self {
            action: Some(AuthAction::Verify),
            ..Default::default()
        }
    }
}

/// Body of every auth endpoint response, success or not
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Application-level outcome of an auth request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    /// `token` is absent for verify, which keeps the token it was given
    Authenticated { user: User, token: Option<String> },
    Rejected { error: Option<String> },
}

impl From<AuthResponse> for AuthResult {
    fn from(response: AuthResponse) -> Self {
        match (response.success, response.user) {
            (true, Some(user)) => AuthResult::Authenticated {
                user,
                token: response.token,
            },
            _ => AuthResult::Rejected {
                error: response.error,
            },
        }
    }
}

impl AuthResult {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthResult::Authenticated { .. })
    }
}
