//! Raw HTTP transport to the storefront backend.
//!
//! Sends one request, attaches the bearer token it is handed, unwraps the
//! response envelope and normalizes failures into [`ApiError`]. It knows
//! nothing about sessions or retries; see [`crate::api::client`] for that.

use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::api::common::{ApiResponse, ErrorBody};
use crate::errors::{ApiError, ApiResult};

/// A request description that can be sent, and replayed, verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub payload: Option<Value>,
    /// Operation name used to tag errors.
    pub caller: &'static str,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, caller: &'static str) -> Self {
        Self {
            method,
            path: path.into(),
            payload: None,
            caller,
        }
    }

    pub fn get(path: impl Into<String>, caller: &'static str) -> Self {
        Self::new(Method::GET, path, caller)
    }

    pub fn post(path: impl Into<String>, caller: &'static str) -> Self {
        Self::new(Method::POST, path, caller)
    }

    pub fn put(path: impl Into<String>, caller: &'static str) -> Self {
        Self::new(Method::PUT, path, caller)
    }

    pub fn delete(path: impl Into<String>, caller: &'static str) -> Self {
        Self::new(Method::DELETE, path, caller)
    }

    /// Attaches a payload: query parameters for GET, JSON body otherwise.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(payload).map_err(|e| {
            ApiError::unknown(format!("Payload serialization failed: {}", e))
                .with_caller(self.caller)
        })?;
        self.payload = Some(value);
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
}

impl Transport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::unknown(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Sends `request`, returning the envelope's `data` (JSON null if absent).
    pub async fn send(&self, request: &ApiRequest, token: Option<&str>) -> ApiResult<Value> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path));

        if let Some(payload) = &request.payload {
            builder = if request.method == Method::GET {
                builder.query(payload)
            } else {
                builder.json(payload)
            };
        }

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        debug!(
            "{} {} (authenticated: {})",
            request.method,
            request.path,
            token.is_some()
        );

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::unknown(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::unknown(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let detail: ErrorBody = serde_json::from_slice(&body).unwrap_or_default();
            debug!("{} {} failed with {}", request.method, request.path, status);
            return Err(ApiError::http(
                status.as_u16(),
                detail.message(),
                detail.error_type(),
            ));
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        let envelope: ApiResponse<Value> = serde_json::from_slice(&body)
            .map_err(|e| ApiError::validation(format!("Unexpected response envelope: {}", e)))?;

        Ok(envelope.data.unwrap_or(Value::Null))
    }
}
