use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::jwt::JwtError;
use crate::jwt::TokenCodec;
use crate::jwt::TokenKind;
use crate::jwt::Verified;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining secret hashing and token signing.
///
/// Every method is synchronous and CPU-bound; async callers should run the
/// hashing ones off the reactor.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
    decoy_hash: String,
}

/// Freshly signed access/refresh pair plus the digest to persist for the
/// refresh token.
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_token_hash: String,
}

impl std::fmt::Debug for IssuedTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedTokens").finish_non_exhaustive()
    }
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// Hashes a random decoy secret once, so unknown-account lookups can pay
    /// the same verification cost as real ones.
    ///
    /// # Errors
    /// * `PasswordError` - The decoy secret could not be hashed
    pub fn new(
        password_hasher: PasswordHasher,
        token_codec: TokenCodec,
    ) -> Result<Self, PasswordError> {
        let decoy_hash = password_hasher.hash(&uuid::Uuid::new_v4().to_string())?;

        Ok(Self {
            password_hasher,
            token_codec,
            decoy_hash,
        })
    }

    /// Hash a secret for storage.
    pub fn hash_secret(&self, secret: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(secret)
    }

    /// Compare a plaintext secret with a stored digest.
    pub fn verify_secret(&self, secret: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(secret, stored_hash)
    }

    /// Run a verification against the decoy digest and discard the result.
    pub fn verify_decoy(&self, secret: &str) {
        let _ = self.password_hasher.verify(secret, &self.decoy_hash);
    }

    /// Sign an access and a refresh token for `payload` and hash the refresh token.
    ///
    /// # Errors
    /// * `JwtError` - Token signing failed
    /// * `PasswordError` - Refresh token hashing failed
    pub fn issue_tokens<T: Serialize>(
        &self,
        payload: &T,
    ) -> Result<IssuedTokens, AuthenticationError> {
        let access_token = self.token_codec.sign(TokenKind::Access, payload)?;
        let refresh_token = self.token_codec.sign(TokenKind::Refresh, payload)?;
        let refresh_token_hash = self.password_hasher.hash(&refresh_token)?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
            refresh_token_hash,
        })
    }

    /// Validate and decode a token of the given kind.
    pub fn verify_token<T: DeserializeOwned>(
        &self,
        token: &str,
        kind: TokenKind,
    ) -> Result<Verified<T>, JwtError> {
        self.token_codec.verify(token, kind)
    }

    pub fn token_codec(&self) -> &TokenCodec {
        &self.token_codec
    }
}
