use std::fmt;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::claims::StampedClaims;
use super::claims::Verified;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Purpose of a session token.
///
/// Each kind is signed with its own secret, so a token of one kind never
/// verifies as the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Signing secret and lifetime for one token kind.
pub struct TokenSettings<'a> {
    pub secret: &'a [u8],
    pub ttl: Duration,
}

/// Signs and verifies access and refresh tokens.
pub struct TokenCodec {
    access: JwtHandler,
    refresh: JwtHandler,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    pub fn new(access: TokenSettings<'_>, refresh: TokenSettings<'_>) -> Self {
        Self {
            access: JwtHandler::new(access.secret),
            refresh: JwtHandler::new(refresh.secret),
            access_ttl: access.ttl,
            refresh_ttl: refresh.ttl,
        }
    }

    /// Lifetime of tokens of the given kind.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Sign `payload` as a token of `kind`, issued now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Payload could not be serialized or signed
    pub fn sign<T: Serialize>(&self, kind: TokenKind, payload: &T) -> Result<String, JwtError> {
        self.sign_at(kind, payload, Utc::now())
    }

    /// Sign `payload` as a token of `kind` issued at `issued_at`.
    ///
    /// The expiry is `issued_at` plus the kind's TTL. An expiry past the
    /// representable calendar range is `EncodingFailed`.
    pub fn sign_at<T: Serialize>(
        &self,
        kind: TokenKind,
        payload: &T,
        issued_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let ttl = chrono::Duration::from_std(self.ttl(kind))
            .map_err(|e| JwtError::EncodingFailed(format!("TTL out of range: {}", e)))?;

        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| JwtError::EncodingFailed(format!("{} token expiry out of range", kind)))?;

        let claims = StampedClaims {
            payload,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        self.handler(kind).encode(&claims)
    }

    /// Verify a token of `kind` and return its payload.
    ///
    /// # Errors
    /// * `TokenExpired` - Signature is valid but `exp` has passed
    /// * `InvalidToken` - Bad signature, wrong kind, or malformed structure
    pub fn verify<T: DeserializeOwned>(
        &self,
        token: &str,
        kind: TokenKind,
    ) -> Result<Verified<T>, JwtError> {
        self.handler(kind)
            .decode::<StampedClaims<T>>(token)
            .map(Verified::from)
    }

    fn handler(&self, kind: TokenKind) -> &JwtHandler {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}
