//! Client library for the storefront backend.
//!
//! Provides the session/token lifecycle ([`auth::store::TokenStore`]), the
//! authenticated request pipeline with one-shot 401 recovery
//! ([`api::client::ApiClient`]), a route guard reacting to session changes,
//! and typed access to the user, product and order endpoints.

pub mod api;
pub mod auth;
pub mod cart;
pub mod config;
pub mod errors;
pub mod navigation;
pub mod storage;
pub mod utils;

pub use api::client::ApiClient;
pub use auth::store::{Session, TokenStore};
pub use config::Config;
pub use errors::{ApiError, ApiResult};
