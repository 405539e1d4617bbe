use crate::error::{AppError, AppResult};
use crate::routes::{AppState, Route};

pub const LOGIN_FAILED: &str = "Error logging in.";
pub const LOGOUT_FAILED: &str = "Error logging out.";

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::InvalidInput(
                "Email and password are required".to_string(),
            ));
        }
        if !self.email.contains('@') {
            return Err(AppError::InvalidInput("Invalid email address".to_string()));
        }
        Ok(())
    }

    /// Log in and move to the user list. Returns whether the user is now
    /// logged in.
    pub async fn submit(&self, state: &mut AppState) -> bool {
        if let Err(e) = self.validate() {
            state.reject(LOGIN_FAILED, &e);
            return false;
        }

        let scope = state.navigator.scope();
        let result = scope
            .run(state.api.login(self.email.trim(), &self.password))
            .await;
        let token = match result {
            None => return false,
            Some(Ok(token)) => token,
            Some(Err(e)) => {
                state.fail(LOGIN_FAILED, e.into());
                return false;
            }
        };

        if let Err(e) = state.session().set_token(&token) {
            state.fail(LOGIN_FAILED, e);
            return false;
        }

        tracing::info!("Logged in as {}", self.email.trim());
        state.navigator.navigate(Route::Users);
        true
    }
}

/// Forget the stored token and return to the login screen.
pub fn logout(state: &mut AppState) -> bool {
    if let Err(e) = state.session().clear() {
        state.fail(LOGOUT_FAILED, e);
        return false;
    }
    state.navigator.navigate(Route::Login);
    true
}
