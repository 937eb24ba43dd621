//! Data structures for authentication-related entities.
//!
//! This module defines the credentials sent to the backend, the server-issued
//! auth response, and the identity derived from token claims.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::user::models::User;

/// Role string the backend issues to administrators.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Login and registration payload
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Server-issued token together with the user it belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Generic `{ message }` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

/// Identity decoded from the current token's claims. Never persisted on its
/// own; always recomputed from the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Absent when the token carries no user id claim.
    pub subject_id: Option<i64>,
    pub email: String,
    pub role: String,
}

impl Identity {
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}
