use crate::core::error::ClientError;

pub const UNREACHABLE_MESSAGE: &str = "Could not reach the server";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

/// A short user-facing message, one per finished action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: &str, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.to_string(),
            description: description.into(),
        }
    }

    pub fn info(title: &str, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.to_string(),
            description: description.into(),
        }
    }

    pub fn error(title: &str, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.to_string(),
            description: description.into(),
        }
    }

    pub fn auth_required() -> Self {
        Self::error("Sign in required", "Sign in or register to send messages")
    }

    pub fn signed_out() -> Self {
        Self::info("See you soon!", "You have signed out")
    }

    /// Map a failed action to a notice. Rejections show the server's text
    /// when it sent one, else `fallback`; transport failures always show the
    /// same generic text.
    pub fn from_failure(err: &ClientError, title: &str, fallback: &str) -> Self {
        match err {
            ClientError::Validation(e) => Self::error("Error", e.to_string()),
            ClientError::Rejected { message, .. } => {
                Self::error(title, message.as_deref().unwrap_or(fallback))
            }
            ClientError::Transport(_) => Self::error("Error", UNREACHABLE_MESSAGE),
            ClientError::AuthRequired => Self::auth_required(),
            ClientError::InvalidTransition { .. } => Self::error("Error", err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = match self.kind {
            NoticeKind::Success => "+",
            NoticeKind::Info => "*",
            NoticeKind::Error => "!",
        };
        write!(f, "[{}] {}: {}", marker, self.title, self.description)
    }
}
