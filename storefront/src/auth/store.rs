//! Process-wide session state and the token lifecycle.
//!
//! [`TokenStore`] is the only writer of the [`Session`]. Each transition
//! replaces the whole session value and publishes it on a `watch` channel, so
//! readers either poll the current snapshot or subscribe to changes.

use parking_lot::Mutex as SyncMutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::api::transport::{ApiRequest, Transport};
use crate::auth::models::{AuthResponse, Identity};
use crate::config::RefreshStrategy;
use crate::errors::{ApiError, ApiResult, ClaimsError};
use crate::storage::SessionStorage;
use crate::utils::jwt::decode_claims;

/// Storage key for the raw access token.
pub const TOKEN_KEY: &str = "access_token";

/// Endpoint that exchanges the current token for a new one.
pub const REFRESH_PATH: &str = "/auth/ping";

/// Tokens with less validity left than this are refreshed on startup.
pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Credentials {
    token: String,
    identity: Identity,
}

/// Immutable snapshot of the current session.
///
/// Token and identity live in one `Option`, so one is never present without
/// the other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    credentials: Option<Credentials>,
    initialized: bool,
}

impl Session {
    fn signed_in(&self, token: String, identity: Identity) -> Self {
        Self {
            credentials: Some(Credentials { token, identity }),
            initialized: self.initialized,
        }
    }

    fn signed_out() -> Self {
        Self {
            credentials: None,
            initialized: true,
        }
    }

    fn mark_initialized(&self) -> Self {
        Self {
            credentials: self.credentials.clone(),
            initialized: true,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.token.as_str())
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.credentials.as_ref().map(|c| &c.identity)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_logged_in(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.identity().is_some_and(Identity::is_admin)
    }
}

pub struct TokenStore {
    state: watch::Sender<Session>,
    storage: Arc<dyn SessionStorage>,
    transport: Transport,
    refresh_threshold: Duration,
    refresh_strategy: RefreshStrategy,
    init_lock: Mutex<()>,
    refresh_gate: Mutex<()>,
    // Serializes session replacement with storage writes.
    write_lock: SyncMutex<()>,
}

impl TokenStore {
    pub fn new(transport: Transport, storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            state,
            storage,
            transport,
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
            refresh_strategy: RefreshStrategy::default(),
            init_lock: Mutex::new(()),
            refresh_gate: Mutex::new(()),
            write_lock: SyncMutex::new(()),
        }
    }

    pub fn with_refresh_threshold(mut self, threshold: Duration) -> Self {
        self.refresh_threshold = threshold;
        self
    }

    pub fn with_refresh_strategy(mut self, strategy: RefreshStrategy) -> Self {
        self.refresh_strategy = strategy;
        self
    }

    pub fn refresh_strategy(&self) -> RefreshStrategy {
        self.refresh_strategy
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receives every session replacement from now on.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().is_initialized()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_logged_in()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    /// Restores the session from persisted storage. A no-op once the store
    /// has been initialized (including by `logout`).
    pub async fn initialize(&self) {
        let _guard = self.init_lock.lock().await;
        if self.is_initialized() {
            return;
        }

        info!("Initializing session from storage");
        let persisted = match self.storage.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!("Session storage unavailable, starting signed out: {}", e);
                None
            }
        };

        let Some(token) = persisted else {
            debug!("No persisted token found");
            self.publish(|session| session.mark_initialized());
            return;
        };

        match decode_claims(&token) {
            Ok(claims) if claims.expires_within(self.refresh_threshold) => {
                info!("Persisted token is close to expiry, refreshing");
                self.refresh_with(Some(&token)).await;
            }
            Ok(claims) => {
                let identity = claims.identity();
                info!("Session restored for {}", identity.email);
                self.publish(|session| session.signed_in(token, identity));
            }
            Err(e) => {
                warn!("Discarding persisted token: {}", e);
                self.logout();
                return;
            }
        }

        self.publish(|session| session.mark_initialized());
    }

    /// Exchanges the current token for a new one. Any failure clears the
    /// session.
    pub async fn refresh(&self) -> bool {
        let token = self.token();
        self.refresh_with(token.as_deref()).await
    }

    /// Refresh entry point for 401 recovery. `rejected` is the token the
    /// failed request was sent with.
    pub(crate) async fn recover(&self, rejected: Option<&str>) -> bool {
        match self.refresh_strategy {
            RefreshStrategy::Independent => self.refresh().await,
            RefreshStrategy::Shared => {
                let _gate = self.refresh_gate.lock().await;
                let current = self.token();
                if current.as_deref() != rejected {
                    debug!("Session already replaced while waiting, skipping refresh");
                    return current.is_some();
                }
                self.refresh_with(current.as_deref()).await
            }
        }
    }

    async fn refresh_with(&self, token: Option<&str>) -> bool {
        match self.request_refresh(token).await {
            Ok(response) => match self.apply_auth_response(&response) {
                Ok(()) => {
                    info!("Token refreshed");
                    true
                }
                Err(e) => {
                    warn!("Refreshed token could not be decoded: {}", e);
                    false
                }
            },
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.logout();
                false
            }
        }
    }

    async fn request_refresh(&self, token: Option<&str>) -> ApiResult<AuthResponse> {
        let request = ApiRequest::post(REFRESH_PATH, "ping");
        let data = self.transport.send(&request, token).await?;
        serde_json::from_value(data)
            .map_err(|e| ApiError::validation(e.to_string()).with_caller(request.caller))
    }

    /// Adopts a server-issued token: decodes the identity from its claims and
    /// persists the raw token. A token that cannot be decoded clears the
    /// session instead.
    pub fn apply_auth_response(&self, response: &AuthResponse) -> Result<(), ClaimsError> {
        let claims = match decode_claims(&response.token) {
            Ok(claims) => claims,
            Err(e) => {
                self.logout();
                return Err(e);
            }
        };
        let identity = claims.identity();
        let token = response.token.clone();

        let _write = self.write_lock.lock();
        if let Err(e) = self.storage.set(TOKEN_KEY, &token) {
            warn!("Failed to persist token: {}", e);
        }
        self.state
            .send_modify(|session| *session = session.signed_in(token, identity));
        Ok(())
    }

    /// Clears the session and the persisted token. Always succeeds.
    pub fn logout(&self) {
        let _write = self.write_lock.lock();
        if self.is_logged_in() {
            info!("Signing out");
        }
        self.state.send_replace(Session::signed_out());
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            warn!("Failed to remove persisted token: {}", e);
        }
    }

    fn publish<F>(&self, transition: F)
    where
        F: FnOnce(&Session) -> Session,
    {
        let _write = self.write_lock.lock();
        self.state.send_modify(|session| *session = transition(session));
    }
}
