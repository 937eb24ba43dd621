//! Authentication endpoints (`/auth/*`).
//!
//! Successful login and registration hand their [`AuthResponse`] to the
//! token store, which is the only place the session changes.

use tracing::{info, warn};

use crate::api::client::ApiClient;
use crate::api::common::validate_payload;
use crate::api::transport::ApiRequest;
use crate::api::user::models::User;
use crate::auth::models::{AuthResponse, LoginRequest, MessageResponse};
use crate::auth::store::REFRESH_PATH;
use crate::errors::{ApiError, ApiResult};

impl ApiClient {
    /// Authenticates with email and password and adopts the issued token.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        self.authenticate("/auth/login", "login", email, password)
            .await
    }

    /// Creates an account and signs in with it.
    pub async fn register(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        self.authenticate("/auth/register", "register", email, password)
            .await
    }

    async fn authenticate(
        &self,
        path: &str,
        caller: &'static str,
        email: &str,
        password: &str,
    ) -> ApiResult<AuthResponse> {
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        validate_payload(&credentials, caller)?;

        let response: AuthResponse = self
            .call(ApiRequest::post(path, caller).payload(&credentials)?)
            .await?;

        self.store().apply_auth_response(&response).map_err(|e| {
            ApiError::validation(format!("Issued token is unreadable: {}", e)).with_caller(caller)
        })?;

        info!("Signed in as {}", response.user.email);
        Ok(response)
    }

    /// Notifies the backend and clears the local session. The session is
    /// cleared even if the backend call fails.
    pub async fn logout(&self) -> ApiResult<Option<MessageResponse>> {
        let result = self
            .call::<Option<MessageResponse>>(ApiRequest::post("/auth/logout", "logout"))
            .await;
        if let Err(e) = &result {
            warn!("Backend logout failed: {}", e);
        }
        self.store().logout();
        result
    }

    pub async fn current_user(&self) -> ApiResult<User> {
        self.call(ApiRequest::get("/auth/user", "getCurrentUser"))
            .await
    }

    /// Calls the refresh endpoint without touching the session. A 401 here is
    /// never recovered.
    pub async fn ping(&self) -> ApiResult<AuthResponse> {
        self.call(ApiRequest::post(REFRESH_PATH, "ping")).await
    }
}
