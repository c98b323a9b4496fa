use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Registered claims wrapped around a service-defined payload.
///
/// The payload's fields are flattened into the token next to `iat`, `exp`
/// and `jti`, so a payload must not define fields with those names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StampedClaims<T> {
    #[serde(flatten)]
    pub payload: T,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Unique token identifier
    pub jti: String,
}

/// Claims of a token whose signature and expiry have been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Verified<T> {
    pub payload: T,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub token_id: String,
}

impl<T> From<StampedClaims<T>> for Verified<T> {
    fn from(claims: StampedClaims<T>) -> Self {
        Self {
            payload: claims.payload,
            issued_at: DateTime::from_timestamp(claims.iat, 0).unwrap_or_default(),
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_default(),
            token_id: claims.jti,
        }
    }
}
