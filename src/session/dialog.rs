use crate::api::AuthApi;
use crate::feedback::loading::LoadingFlag;
use crate::feedback::notice::Notice;
use crate::session::controller::SessionController;
use crate::validation::forms::{LoginForm, RegisterForm};

/// Login/registration flow: validates, submits through the controller, and
/// reports every outcome as a notice
#[derive(Debug, Default)]
pub struct AuthDialog {
    loading: LoadingFlag,
}

impl AuthDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub async fn submit_login<A: AuthApi>(
        &self,
        controller: &mut SessionController<A>,
        form: &LoginForm,
    ) -> Notice {
        if let Err(e) = form.validate() {
            return Notice::error("Error", e.to_string());
        }

        let _loading = self.loading.begin();
        match controller.login(form).await {
            Ok(user) => Notice::success("Signed in", format!("Welcome, {}!", user.username)),
            Err(e) => Notice::from_failure(&e, "Sign-in failed", "Invalid username or password"),
        }
    }

    pub async fn submit_register<A: AuthApi>(
        &self,
        controller: &mut SessionController<A>,
        form: &RegisterForm,
    ) -> Notice {
        if let Err(e) = form.validate() {
            return Notice::error("Error", e.to_string());
        }

        let _loading = self.loading.begin();
        match controller.register(form).await {
            Ok(user) => Notice::success(
                "Registered",
                format!("Account {} created!", user.username),
            ),
            Err(e) => Notice::from_failure(&e, "Registration failed", "Could not create account"),
        }
    }
}
