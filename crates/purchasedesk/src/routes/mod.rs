pub mod login;
pub mod purchases;
pub mod users;

use std::fmt;
use std::future::Future;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::auth::SessionStore;
use crate::config::{Config, ErrorPolicy};
use crate::error::AppError;
use crate::notify::{Notifier, Toast};
use crate::services::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Users,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Users => "/users",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Lifetime of a mounted screen.
///
/// Cancelled when the navigator leaves the route it was issued for. Work run
/// through [`ViewScope::run`] resolves to `None` once cancelled, so a late
/// response can never reach a screen that is gone.
#[derive(Debug, Clone)]
pub struct ViewScope {
    route: Route,
    token: CancellationToken,
}

impl ViewScope {
    fn new(route: Route) -> Self {
        Self {
            route,
            token: CancellationToken::new(),
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub async fn run<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

#[derive(Debug)]
pub struct Navigator {
    current: ViewScope,
    history: Vec<Route>,
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            current: ViewScope::new(start),
            history: vec![start],
        }
    }

    pub fn current(&self) -> Route {
        self.current.route
    }

    /// Every route visited, in order, including the starting one.
    pub fn history(&self) -> &[Route] {
        &self.history
    }

    /// Scope of the screen mounted on the current route.
    pub fn scope(&self) -> ViewScope {
        self.current.clone()
    }

    /// Leave the current route. Navigating to the route already shown keeps
    /// the mounted screen.
    pub fn navigate(&mut self, route: Route) {
        if route == self.current.route {
            return;
        }
        tracing::debug!("Navigating {} -> {}", self.current.route, route);
        self.current.cancel();
        self.current = ViewScope::new(route);
        self.history.push(route);
    }
}

/// State shared by every screen.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub api: ApiClient,
    pub navigator: Navigator,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(config: Config, session: SessionStore, start: Route) -> Self {
        let api = ApiClient::new(&config.api_url, session);
        let notifier = Notifier::new(config.toast_ttl);
        Self {
            config,
            api,
            navigator: Navigator::new(start),
            notifier,
        }
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    /// Handle a failed operation: log it, raise `message` as a toast and
    /// send the user back to login when the policy calls for it.
    pub fn fail(&mut self, message: &str, err: AppError) {
        tracing::error!(kind = err.kind(), "{message} {err}");
        self.notifier.push(message);

        let relogin = match self.config.error_policy {
            ErrorPolicy::Blanket => true,
            ErrorPolicy::PerKind => err.is_unauthorized(),
        };
        if relogin {
            self.navigator.navigate(Route::Login);
        }
    }

    /// Input rejected before any request was made.
    pub fn reject(&mut self, message: &str, err: &AppError) {
        tracing::warn!("{message} {err}");
        self.notifier.push(message);
    }

    /// Toasts still on screen at `now`, visible one first. Expired toasts
    /// are dropped and the queue is left empty.
    pub fn take_toasts(&mut self, now: Instant) -> Vec<Toast> {
        self.notifier.expire(now);
        self.notifier.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use reqwest::StatusCode;
    use std::time::Duration;

    fn state(policy: ErrorPolicy) -> AppState {
        let mut config = Config::for_api("http://127.0.0.1:9", "unused.json").unwrap();
        config.error_policy = policy;
        AppState::new(config, SessionStore::in_memory(), Route::Users)
    }

    #[test]
    fn leaving_a_route_cancels_its_scope() {
        let mut navigator = Navigator::new(Route::Users);
        let scope = navigator.scope();
        navigator.navigate(Route::Users);
        assert!(scope.is_active());

        navigator.navigate(Route::Login);
        assert!(!scope.is_active());
        assert!(navigator.scope().is_active());
        assert_eq!(navigator.history(), &[Route::Users, Route::Login]);
    }

    #[tokio::test]
    async fn cancelled_scope_drops_result() {
        let scope = ViewScope::new(Route::Users);
        assert_eq!(scope.run(async { 1 }).await, Some(1));
        scope.cancel();
        assert_eq!(scope.run(async { 2 }).await, None);
    }

    #[test]
    fn per_kind_policy_only_relogs_on_unauthorized() {
        let mut app = state(ErrorPolicy::PerKind);
        app.fail(
            "Error fetching users.",
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR).into(),
        );
        assert_eq!(app.navigator.current(), Route::Users);
        assert_eq!(app.notifier.visible().unwrap().message, "Error fetching users.");

        app.fail(
            "Error fetching purchases.",
            ApiError::from_status(StatusCode::UNAUTHORIZED).into(),
        );
        assert_eq!(app.navigator.current(), Route::Login);
    }

    #[test]
    fn blanket_policy_always_relogs() {
        let mut app = state(ErrorPolicy::Blanket);
        app.fail(
            "Error fetching users.",
            ApiError::from_status(StatusCode::BAD_GATEWAY).into(),
        );
        assert_eq!(app.navigator.current(), Route::Login);
        assert!(!app.notifier.visible().unwrap().message.is_empty());
    }

    #[test]
    fn take_toasts_skips_expired_ones() {
        let mut app = state(ErrorPolicy::PerKind);
        let start = Instant::now();
        app.notifier.push_at("Error fetching users.", start);
        app.notifier.push_at("Error fetching purchases.", start);

        // The first toast ran out at 6 s, the second is shown from then on.
        let toasts = app.take_toasts(start + Duration::from_secs(7));
        let messages: Vec<&str> = toasts.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["Error fetching purchases."]);
        assert!(app.notifier.is_empty());
    }
}
