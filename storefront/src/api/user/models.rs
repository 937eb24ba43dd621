use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::common::deserialize_id;

/// User as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub email: String,
    pub role: String,
}

/// Payload for creating a user
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub password: String,
}

/// Partial update; unset fields are left untouched by the backend
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
