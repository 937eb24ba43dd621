//! Route guard: redirects navigation according to session state.
//!
//! A [`GuardPolicy`] classifies routes; [`RouteGuard`] applies it whenever the
//! session or the current path changes.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::auth::store::{Session, TokenStore};
use crate::navigation::Navigator;

pub const HOME_PATH: &str = "/";
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Which routes require an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    /// Every route (`true`) or none (`false`).
    All(bool),
    /// Routes whose path starts with one of these prefixes.
    Prefixes(Vec<String>),
}

impl Default for RouteMatch {
    fn default() -> Self {
        RouteMatch::All(false)
    }
}

impl RouteMatch {
    pub fn prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RouteMatch::Prefixes(prefixes.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            RouteMatch::All(required) => *required,
            RouteMatch::Prefixes(prefixes) => prefixes.iter().any(|p| path.starts_with(p.as_str())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GuardPolicy {
    pub routes: RouteMatch,
    /// Where unauthenticated visitors are sent; defaults to `/login`.
    pub redirect_to: Option<String>,
    /// Only signed-out visitors may stay (e.g. the login page).
    pub public_only: bool,
    /// Only administrators may stay.
    pub admin_only: bool,
}

impl GuardPolicy {
    pub fn requires_auth(&self, path: &str) -> bool {
        self.routes.matches(path)
    }

    pub fn redirect_path(&self) -> &str {
        self.redirect_to.as_deref().unwrap_or(DEFAULT_LOGIN_PATH)
    }

    /// Where a visitor on `path` with `session` must be sent, if anywhere.
    pub fn decide(&self, path: &str, session: &Session) -> Option<&str> {
        if self.requires_auth(path) && !session.is_logged_in() {
            return Some(self.redirect_path());
        }
        if self.admin_only && !session.is_admin() {
            return Some(HOME_PATH);
        }
        if self.public_only && session.is_logged_in() {
            return Some(HOME_PATH);
        }
        None
    }
}

pub struct RouteGuard<N: Navigator> {
    policy: GuardPolicy,
    store: Arc<TokenStore>,
    navigator: Arc<N>,
}

impl<N: Navigator + 'static> RouteGuard<N> {
    pub fn new(policy: GuardPolicy, store: Arc<TokenStore>, navigator: Arc<N>) -> Self {
        Self {
            policy,
            store,
            navigator,
        }
    }

    pub fn policy(&self) -> &GuardPolicy {
        &self.policy
    }

    /// Applies the policy to the current path, initializing the session
    /// first if needed. Returns the redirect target, if one was taken.
    pub async fn evaluate(&self) -> Option<String> {
        if !self.store.is_initialized() {
            self.store.initialize().await;
        }

        let session = self.store.snapshot();
        let path = self.navigator.current_path();
        let target = self.policy.decide(&path, &session)?.to_string();
        self.redirect(&path, target)
    }

    /// Reaction to the session dropping from signed-in to signed-out.
    fn on_signed_out(&self) -> Option<String> {
        let path = self.navigator.current_path();
        if !self.policy.requires_auth(&path) {
            return None;
        }
        self.redirect(&path, self.policy.redirect_path().to_string())
    }

    fn redirect(&self, from: &str, to: String) -> Option<String> {
        if from == to {
            return None;
        }
        info!("Route guard redirecting {} -> {}", from, to);
        self.navigator.navigate(&to);
        Some(to)
    }

    /// Watches session and navigation changes in a background task until the
    /// handle is aborted.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut sessions = self.store.subscribe();
            let mut paths = self.navigator.subscribe();
            let mut was_logged_in = sessions.borrow_and_update().is_logged_in();

            self.evaluate().await;

            loop {
                tokio::select! {
                    changed = sessions.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let (logged_in, initialized) = {
                            let session = sessions.borrow_and_update();
                            (session.is_logged_in(), session.is_initialized())
                        };
                        if was_logged_in && !logged_in && initialized {
                            self.on_signed_out();
                        }
                        was_logged_in = logged_in;
                    }
                    changed = paths.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        paths.borrow_and_update();
                    }
                }

                self.evaluate().await;
            }
        })
    }
}
