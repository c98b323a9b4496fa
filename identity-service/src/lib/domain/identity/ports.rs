use async_trait::async_trait;

use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::PublicIdentity;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::TokenPair;
use crate::identity::errors::IdentityError;

/// Port for credential and session lifecycle operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new identity.
    ///
    /// # Arguments
    /// * `command` - Validated email, password and role
    ///
    /// # Returns
    /// Public view of the created identity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<PublicIdentity, IdentityError>;

    /// Check an email/password pair.
    ///
    /// Unknown email and wrong password fail identically.
    ///
    /// # Returns
    /// Matching identity
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `DatabaseError` - Database operation failed
    async fn validate_credentials(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<Identity, IdentityError>;

    /// Sign a fresh token pair and make its refresh token the only active one.
    ///
    /// # Errors
    /// * `NotFound` - Identity vanished from storage
    /// * `DatabaseError` - Database operation failed
    async fn issue_token_pair(&self, identity: &Identity) -> Result<TokenPair, IdentityError>;

    /// Replace the active refresh token with a new pair.
    ///
    /// Bumps the token version first when the session policy asks for it.
    ///
    /// # Errors
    /// * `NotFound` - Identity vanished from storage
    /// * `DatabaseError` - Database operation failed
    async fn rotate_refresh_token(&self, identity: &Identity)
        -> Result<TokenPair, IdentityError>;

    /// Forget the active refresh token. Idempotent; unknown ids succeed.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn revoke(&self, id: &IdentityId) -> Result<(), IdentityError>;

    /// Resolve the identity owning a raw refresh token.
    ///
    /// # Errors
    /// * `InvalidToken` / `TokenExpired` - Signature, structure or expiry check failed
    /// * `TokenRevoked` - No identity or no active refresh token
    /// * `StaleTokenVersion` - Token predates a global invalidation
    /// * `TokenSuperseded` - A newer refresh token has been issued
    /// * `DatabaseError` - Database operation failed
    async fn authenticate_refresh(&self, refresh_token: &str) -> Result<Identity, IdentityError>;

    /// Resolve the identity carried by a raw access token.
    ///
    /// # Errors
    /// * `InvalidToken` / `TokenExpired` - Signature, structure or expiry check failed
    /// * `StaleTokenVersion` - Version check enabled and the token is stale
    /// * `DatabaseError` - Database operation failed
    async fn authenticate_access(&self, access_token: &str)
        -> Result<PublicIdentity, IdentityError>;

    /// Invalidate every outstanding token of an identity.
    ///
    /// # Errors
    /// * `NotFound` - Identity does not exist
    /// * `DatabaseError` - Database operation failed
    async fn invalidate_all(&self, id: &IdentityId) -> Result<(), IdentityError>;
}

/// Persistence operations for identity rows.
///
/// Every method is a single atomic row operation.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist a new identity.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, identity: Identity) -> Result<Identity, IdentityError>;

    /// Retrieve identity by identifier.
    ///
    /// # Returns
    /// Optional identity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, IdentityError>;

    /// Retrieve identity by exact email.
    ///
    /// # Returns
    /// Optional identity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress)
        -> Result<Option<Identity>, IdentityError>;

    /// Overwrite or clear the stored refresh token digest.
    ///
    /// Clearing an unknown identity is a no-op.
    ///
    /// # Errors
    /// * `NotFound` - Setting a digest on an identity that does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_refresh_token_hash(
        &self,
        id: &IdentityId,
        hash: Option<String>,
    ) -> Result<(), IdentityError>;

    /// Atomically increment the token version.
    ///
    /// # Returns
    /// The new token version
    ///
    /// # Errors
    /// * `NotFound` - Identity does not exist
    /// * `DatabaseError` - Database operation failed
    async fn increment_token_version(&self, id: &IdentityId) -> Result<i64, IdentityError>;
}
