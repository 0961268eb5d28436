use tracing::{debug, info, warn};

use crate::api::AuthApi;
use crate::core::error::ClientError;
use crate::models::auth::AuthResult;
use crate::models::user::User;
use crate::stores::session_store::SessionStore;
use crate::validation::forms::{LoginForm, RegisterForm};

/// Bearer token and the user it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    /// A stored token is being checked with the server
    Verifying,
    Authenticated(Session),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Anonymous => "signed out",
            SessionState::Verifying => "verifying a stored session",
            SessionState::Authenticated(_) => "signed in",
        }
    }
}

/// Owns the client-side session: restores it at startup, opens it on
/// login or registration, and closes it on logout
pub struct SessionController<A> {
    store: SessionStore,
    auth: A,
    state: SessionState,
    restored: bool,
}

impl<A: AuthApi> SessionController<A> {
    pub fn new(store: SessionStore, auth: A) -> Self {
        Self {
            store,
            auth,
            state: SessionState::Anonymous,
            restored: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(|session| &session.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    /// Re-check a stored session with the server. Runs once; later calls
    /// return the current state untouched.
    pub async fn restore(&mut self) -> &SessionState {
        if self.restored || !matches!(self.state, SessionState::Anonymous) {
            debug!(state = self.state.name(), "Session restore skipped");
            return &self.state;
        }
        self.restored = true;

        let (token, cached) = match (self.store.token(), self.store.user()) {
            (Some(token), Some(user)) => (token, user),
            (None, None) => {
                debug!("No stored session to restore");
                return &self.state;
            }
            _ => {
                info!("Stored session is incomplete, clearing it");
                self.clear();
                return &self.state;
            }
        };

        self.state = SessionState::Verifying;

        match self.auth.verify(&token).await {
            Ok(AuthResult::Authenticated { user, .. }) => {
                if user != cached {
                    debug!(user_id = user.id, "Stored user differs from server copy, refreshing");
                }
                if let Err(e) = self.store.save_user(&user) {
                    warn!(error = %e, "Failed to refresh cached user");
                }
                info!(user_id = user.id, username = %user.username, "Stored session verified");
                self.state = SessionState::Authenticated(Session { token, user });
            }
            Ok(AuthResult::Rejected { error }) => {
                info!(
                    user_id = cached.id,
                    reason = error.as_deref().unwrap_or("unspecified"),
                    "Stored session rejected, signing out"
                );
                self.clear();
            }
            Err(e) => {
                warn!(user_id = cached.id, error = %e, "Could not verify stored session, signing out");
                self.clear();
            }
        }

        &self.state
    }

    pub async fn login(&mut self, form: &LoginForm) -> Result<User, ClientError> {
        self.ensure_anonymous("sign in")?;
        form.validate()?;

        let result = self.auth.login(form.username.trim(), &form.password).await?;
        self.establish(result)
    }

    pub async fn register(&mut self, form: &RegisterForm) -> Result<User, ClientError> {
        self.ensure_anonymous("register")?;
        form.validate()?;

        let result = self
            .auth
            .register(
                form.username.trim(),
                form.email.trim(),
                &form.password,
                form.nick(),
            )
            .await?;
        self.establish(result)
    }

    /// Drop the session and the stored credentials, from any state
    pub fn logout(&mut self) {
        if let Some(user) = self.user() {
            info!(user_id = user.id, "Signed out");
        }
        self.clear();
    }

    fn clear(&mut self) {
        self.state = SessionState::Anonymous;
        if let Err(e) = self.store.logout() {
            warn!(error = %e, "Failed to clear stored session");
        }
    }

    fn ensure_anonymous(&self, action: &'static str) -> Result<(), ClientError> {
        match self.state {
            SessionState::Anonymous => Ok(()),
            ref other => Err(ClientError::InvalidTransition {
                action,
                state: other.name(),
            }),
        }
    }

    fn establish(&mut self, result: AuthResult) -> Result<User, ClientError> {
        match result {
            AuthResult::Authenticated {
                user,
                token: Some(token),
            } => {
                if let Err(e) = self.store.save_session(&token, &user) {
                    warn!(error = %e, "Failed to persist session, it will not survive a restart");
                }
                info!(user_id = user.id, username = %user.username, "Signed in");
                self.state = SessionState::Authenticated(Session {
                    token,
                    user: user.clone(),
                });
                Ok(user)
            }
            AuthResult::Authenticated { token: None, .. } => {
                warn!("Auth response carried no token");
                Err(ClientError::Rejected {
                    status: None,
                    message: None,
                })
            }
            AuthResult::Rejected { error } => Err(ClientError::Rejected {
                status: None,
                message: error,
            }),
        }
    }
}
