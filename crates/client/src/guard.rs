//! Route guard: blocks a page until permissions are known, then either lets
//! it render or sends the user somewhere they are allowed to be.
//!
//! ```text
//! AuthCheck ──no token──▶ Unauthenticated (redirect to login, terminal)
//!     │
//!     ▼
//! LoadingPermissions ──load failed──▶ Failed
//!     │
//!     ├──allowed──▶ Allowed
//!     └──denied───▶ DeniedRedirecting (one navigation) ──no other route──▶ Failed
//! ```

use thiserror::Error;

use orthodash_auth::{PermissionSet, PrincipalMode, normalize};

use crate::config::RetryPolicy;
use crate::context::{FeatureAccessContext, RefreshError};
use crate::session::SessionStore;

/// Performs client-side navigation.
pub trait Navigator {
    fn navigate(&mut self, route: &str);
}

impl<N: Navigator + ?Sized> Navigator for &mut N {
    fn navigate(&mut self, route: &str) {
        (**self).navigate(route);
    }
}

/// Navigator that only records where it was sent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingNavigator {
    pub visited: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, route: &str) {
        self.visited.push(route.to_string());
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardFailure {
    #[error("feature access could not be loaded after {attempts} attempt(s): {message}")]
    PermissionsUnavailable { attempts: u32, message: String },

    #[error("'{route}' is denied and no other route is accessible")]
    NoAccessibleRoute { route: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    AuthCheck,
    Unauthenticated { login_route: String },
    LoadingPermissions,
    Allowed,
    DeniedRedirecting { target: String },
    Failed(GuardFailure),
}

/// What the guarded page should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardView {
    Loading,
    Content,
    Error(String),
}

#[derive(Debug)]
pub struct RouteGuard<N: Navigator> {
    navigator: N,
    login_route: String,
    state: GuardState,
    redirect_issued: bool,
}

impl<N: Navigator> RouteGuard<N> {
    pub fn new(navigator: N, login_route: impl Into<String>) -> Self {
        Self {
            navigator,
            login_route: login_route.into(),
            state: GuardState::AuthCheck,
            redirect_issued: false,
        }
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn view(&self) -> GuardView {
        match &self.state {
            GuardState::Allowed => GuardView::Content,
            GuardState::Failed(failure) => GuardView::Error(failure.to_string()),
            _ => GuardView::Loading,
        }
    }

    /// Call after a navigation has completed; the next route gets a fresh
    /// decision (and a fresh redirect allowance).
    pub fn navigation_completed(&mut self) {
        if matches!(self.state, GuardState::Unauthenticated { .. }) {
            return;
        }
        self.state = GuardState::AuthCheck;
        self.redirect_issued = false;
    }

    /// Auth check. Without a token the guard redirects to login and stops.
    ///
    /// A failed pass starts loading again.
    pub fn check_session<S>(&mut self, session: &S) -> bool
    where
        S: SessionStore + ?Sized,
    {
        if session.is_authenticated() {
            if matches!(self.state, GuardState::AuthCheck | GuardState::Failed(_)) {
                self.state = GuardState::LoadingPermissions;
            }
            return true;
        }

        tracing::info!(login_route = %self.login_route, "no session, redirecting to login");
        let login_route = self.login_route.clone();
        self.redirect_once(&login_route);
        self.state = GuardState::Unauthenticated { login_route };
        false
    }

    /// Decide the current route against a loaded set.
    ///
    /// Only decides once the session check has passed; in any other state
    /// this is a no-op. An empty set makes no decision (the guard keeps
    /// loading). Re-evaluating a denied route never navigates twice.
    pub fn evaluate(&mut self, pathname: &str, set: &PermissionSet, mode: PrincipalMode) -> &GuardState {
        if !matches!(
            self.state,
            GuardState::LoadingPermissions | GuardState::Allowed | GuardState::DeniedRedirecting { .. }
        ) {
            tracing::debug!(pathname, state = ?self.state, "not ready to decide, skipping");
            return &self.state;
        }
        if set.is_empty() {
            self.state = GuardState::LoadingPermissions;
            return &self.state;
        }

        if set.is_allowed(pathname) {
            tracing::debug!(pathname, "route allowed");
            self.state = GuardState::Allowed;
            return &self.state;
        }

        let Some(target) = set.landing_route_for(pathname, mode).map(str::to_string) else {
            tracing::warn!(pathname, %mode, "route denied and no other route to land on");
            self.state = GuardState::Failed(GuardFailure::NoAccessibleRoute {
                route: normalize(pathname),
            });
            return &self.state;
        };

        tracing::info!(pathname, target = %target, %mode, "route denied, redirecting");
        self.redirect_once(&target);
        self.state = GuardState::DeniedRedirecting { target };
        &self.state
    }

    /// Permission loading gave up.
    pub fn fail(&mut self, error: &RefreshError) {
        if matches!(self.state, GuardState::Unauthenticated { .. }) {
            return;
        }
        self.state = GuardState::Failed(GuardFailure::PermissionsUnavailable {
            attempts: error.attempts,
            message: error.last.to_string(),
        });
    }

    /// Full pass: auth check, load (or reuse) permissions, decide.
    pub async fn run<S>(
        &mut self,
        pathname: &str,
        context: &FeatureAccessContext,
        session: &S,
        retry: &RetryPolicy,
    ) -> &GuardState
    where
        S: SessionStore + ?Sized,
    {
        if !self.check_session(session) {
            return &self.state;
        }

        let set = match context.permissions() {
            Some(set) => set,
            None => match context.refresh_with_retry(retry).await {
                Ok(set) => set,
                Err(e) => {
                    self.fail(&e);
                    return &self.state;
                }
            },
        };

        self.evaluate(pathname, &set, session.principal_mode())
    }

    fn redirect_once(&mut self, route: &str) {
        if self.redirect_issued {
            tracing::debug!(route, "redirect already issued, skipping");
            return;
        }
        self.redirect_issued = true;
        self.navigator.navigate(route);
    }
}
