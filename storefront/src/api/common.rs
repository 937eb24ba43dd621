//! Shared wire types for backend responses.
//!
//! The backend wraps every payload in the same envelope:
//! - `success`: whether the operation succeeded
//! - `message`: human-readable message
//! - `data`: the payload itself
//! - `error` / `errorCode`: failure details
//! - `timestamp`: server time in milliseconds
//!
//! List endpoints put a page object inside `data`:
//! `{ total, size, current, pages, records }`.
//!
//! Identifiers are 64-bit integers that some endpoints serialize as strings,
//! so the id helpers here accept either form.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use validator::{Validate, ValidationErrors};

use crate::errors::ApiError;

/// Standard backend response envelope
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Error body of a non-2xx response
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl ErrorBody {
    pub fn message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_default()
    }

    pub fn error_type(&self) -> Option<String> {
        self.error_type.clone().or_else(|| self.error_code.clone())
    }
}

/// One page of a paginated list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    /// Total number of records across all pages
    pub total: u64,
    /// Page size
    pub size: u64,
    /// Current page number (1-indexed)
    pub current: u64,
    /// Total number of pages
    pub pages: u64,
    /// Records on this page
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.current < self.pages
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }
}

/// Pagination parameters for list requests
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PageQuery {
    /// Page number (1-indexed)
    #[validate(range(min = 1, message = "Page number starts at 1"))]
    pub current: u32,
    /// Number of records per page
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub size: u32,
}

impl PageQuery {
    pub fn new(current: u32, size: u32) -> Self {
        Self { current, size }
    }

    pub fn next(&self) -> Self {
        Self::new(self.current.saturating_add(1), self.size)
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            current: 1,
            size: 20,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Number(i64),
    Text(String),
}

fn parse_id<E: serde::de::Error>(raw: StringOrNumber) -> Result<i64, E> {
    match raw {
        StringOrNumber::Number(n) => Ok(n),
        StringOrNumber::Text(s) => i64::from_str(s.trim())
            .map_err(|e| E::custom(format!("Invalid id '{}': {}", s, e))),
    }
}

/// Deserializes an id sent either as a JSON number or a numeric string.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    parse_id(StringOrNumber::deserialize(deserializer)?)
}

/// Optional variant of [`deserialize_id`]; use with `#[serde(default)]`.
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer)?
        .map(parse_id)
        .transpose()
}

/// Flattens validator errors into one message, fields in sorted order.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

/// Runs payload validation, producing a `validation_error` for `caller`.
pub fn validate_payload<T: Validate>(payload: &T, caller: &str) -> Result<(), ApiError> {
    payload
        .validate()
        .map_err(|errors| ApiError::validation(validation_message(&errors)).with_caller(caller))
}

/// Joins a path prefix and an id.
pub fn resource_path(prefix: &str, id: impl Display) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), id)
}
