//! Authenticated request pipeline.
//!
//! [`ApiClient`] sends every request with the store's current token, decodes
//! the response into the caller's type, and recovers from a single
//! authorization failure per request by refreshing the token and replaying
//! the request once.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::transport::{ApiRequest, Transport};
use crate::auth::store::{REFRESH_PATH, TokenStore};
use crate::config::Config;
use crate::errors::{ApiError, ApiResult};
use crate::storage::SessionStorage;

/// Per-request recovery context. Lives for one call, so the one-shot retry
/// cannot leak between requests.
#[derive(Debug, Default)]
struct Attempt {
    retried: bool,
}

impl Attempt {
    fn may_recover(&self, request: &ApiRequest, error: &ApiError) -> bool {
        error.is_unauthorized() && !self.retried && !is_refresh_path(&request.path)
    }
}

fn is_refresh_path(path: &str) -> bool {
    path.trim_start_matches('/') == REFRESH_PATH.trim_start_matches('/')
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Transport,
    store: Arc<TokenStore>,
}

impl ApiClient {
    /// Builds a client and its token store from configuration.
    pub fn new(config: &Config, storage: Arc<dyn SessionStorage>) -> ApiResult<Self> {
        let transport = Transport::new(&config.api_base_url, config.request_timeout())?;
        let store = TokenStore::new(transport.clone(), storage)
            .with_refresh_threshold(config.refresh_threshold())
            .with_refresh_strategy(config.refresh_strategy);

        info!("API client targeting {}", transport.base_url());
        Ok(Self::from_parts(transport, Arc::new(store)))
    }

    pub fn from_parts(transport: Transport, store: Arc<TokenStore>) -> Self {
        Self { transport, store }
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Performs `request` and decodes its `data` into `T`. A shape mismatch
    /// is reported as a validation error.
    pub async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let caller = request.caller;
        let data = self.call_raw(request).await?;
        serde_json::from_value(data)
            .map_err(|e| ApiError::validation(e.to_string()).with_caller(caller))
    }

    /// Performs `request` and hands back `data` unvalidated.
    pub async fn call_raw(&self, request: ApiRequest) -> ApiResult<Value> {
        self.execute(&request)
            .await
            .map_err(|e| e.with_caller(request.caller))
    }

    async fn execute(&self, request: &ApiRequest) -> ApiResult<Value> {
        let mut attempt = Attempt::default();
        loop {
            let token = self.store.token();
            match self.transport.send(request, token.as_deref()).await {
                Err(error) if attempt.may_recover(request, &error) => {
                    attempt.retried = true;
                    debug!("{} rejected as unauthorized, refreshing", request.path);
                    if !self.store.recover(token.as_deref()).await {
                        return Err(error);
                    }
                    debug!("Replaying {}", request.path);
                }
                result => return result,
            }
        }
    }
}
