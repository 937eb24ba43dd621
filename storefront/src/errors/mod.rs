//! Global client error types.
//!
//! Every failure that leaves the request pipeline is normalized into an
//! [`ApiError`], whatever the underlying transport or decoding library
//! reported. Storage and token-decoding failures have their own types since
//! the session store never surfaces them to callers beyond a boolean.

use thiserror::Error;

/// The three categories a pipeline failure is normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Response (or outbound payload) failed its shape check.
    Validation,
    /// Non-2xx response from the backend.
    Http,
    /// Transport failure or anything uncategorized.
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::Http => "http_error",
            ErrorKind::Unknown => "unknown_error",
        }
    }
}

/// Normalized error returned by every API call.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{}", describe(.caller, .message, .status))]
    Validation {
        status: u16,
        message: String,
        caller: Option<String>,
    },

    #[error("{}", describe(.caller, .message, .status))]
    Http {
        status: u16,
        message: String,
        error_type: Option<String>,
        caller: Option<String>,
    },

    #[error("{}", describe(.caller, .message, .status))]
    Unknown {
        status: u16,
        message: String,
        caller: Option<String>,
    },
}

pub type ApiResult<T> = Result<T, ApiError>;

fn describe(caller: &Option<String>, message: &str, status: &u16) -> String {
    let body = if message.is_empty() {
        status.to_string()
    } else {
        message.to_string()
    };
    match caller {
        Some(caller) => format!("[{}] {}", caller, body),
        None => body,
    }
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            status: 400,
            message: message.into(),
            caller: None,
        }
    }

    pub fn http(status: u16, message: impl Into<String>, error_type: Option<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            error_type,
            caller: None,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            status: 500,
            message: message.into(),
            caller: None,
        }
    }

    /// Tags the error with the operation that produced it. An existing tag
    /// is kept so the innermost operation name wins.
    pub fn with_caller(mut self, name: &str) -> Self {
        let slot = match &mut self {
            Self::Validation { caller, .. } => caller,
            Self::Http { caller, .. } => caller,
            Self::Unknown { caller, .. } => caller,
        };
        if slot.is_none() {
            *slot = Some(name.to_string());
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Http { .. } => ErrorKind::Http,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Validation { status, .. }
            | Self::Http { status, .. }
            | Self::Unknown { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::Http { message, .. }
            | Self::Unknown { message, .. } => message,
        }
    }

    /// Machine-readable type: the server-provided one for HTTP failures,
    /// `validation_error` for shape failures.
    pub fn error_type(&self) -> Option<&str> {
        match self {
            Self::Validation { .. } => Some(ErrorKind::Validation.as_str()),
            Self::Http { error_type, .. } => error_type.as_deref(),
            Self::Unknown { .. } => None,
        }
    }

    pub fn caller(&self) -> Option<&str> {
        match self {
            Self::Validation { caller, .. }
            | Self::Http { caller, .. }
            | Self::Unknown { caller, .. } => caller.as_deref(),
        }
    }

    /// True for a backend authorization failure (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }
}

/// Errors raised by persisted session storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session storage is unavailable")]
    Unavailable,

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Errors raised while decoding token claims.
#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("Token decode failed: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),
}
