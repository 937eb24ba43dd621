//! JWT claims decoding for the client side of authentication.
//!
//! The client never holds the signing secret, so tokens are decoded without
//! signature or expiry validation; the backend stays the authority on both.
//! Expiry is only read to decide when to refresh proactively.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::api::common::deserialize_optional_id;
use crate::auth::models::Identity;
use crate::errors::ClaimsError;

/// Claims issued by the storefront backend.
///
/// The backend signs the user id as `userId`; `id` is accepted as well.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User ID
    #[serde(
        default,
        alias = "userId",
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,
    /// User email
    pub sub: String,
    /// User role
    pub role: String,
    /// Token expiration timestamp (seconds since epoch)
    pub exp: i64,
}

/// Decodes token claims without verifying the signature.
pub fn decode_claims(token: &str) -> Result<Claims, ClaimsError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

impl Claims {
    /// Seconds of validity left at `now`; negative once expired. Saturates
    /// for out-of-range `exp` values.
    pub fn seconds_remaining(&self, now: i64) -> i64 {
        self.exp.saturating_sub(now)
    }

    /// True if the token expires within `threshold` from now, or already has.
    pub fn expires_within(&self, threshold: Duration) -> bool {
        let threshold = i64::try_from(threshold.as_secs()).unwrap_or(i64::MAX);
        self.seconds_remaining(Utc::now().timestamp()) < threshold
    }

    pub fn identity(&self) -> Identity {
        Identity {
            subject_id: self.id,
            email: self.sub.clone(),
            role: self.role.clone(),
        }
    }
}
