use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenKind;
use auth::Verified;
use chrono::Utc;
use tokio::sync::Semaphore;

use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::PublicIdentity;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::SessionClaims;
use crate::domain::identity::models::SessionPolicy;
use crate::domain::identity::models::TokenPair;
use crate::identity::errors::IdentityError;
use crate::identity::ports::AuthServicePort;
use crate::identity::ports::CredentialStore;

/// Domain service implementation for credential and session operations.
///
/// Argon2 work (password hashing, refresh token digests) runs on the blocking
/// pool, bounded by `hashing_permits`. A permit is released only when the
/// blocking work finishes, even if the caller has gone away.
pub struct AuthService<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    authenticator: Arc<Authenticator>,
    policy: SessionPolicy,
    hashing_permits: Arc<Semaphore>,
}

impl<S> AuthService<S>
where
    S: CredentialStore,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Identity persistence implementation
    /// * `authenticator` - Secret hashing and token signing
    /// * `policy` - Session behaviour toggles
    /// * `max_concurrent_hashes` - Upper bound on simultaneous Argon2 computations
    pub fn new(
        store: Arc<S>,
        authenticator: Arc<Authenticator>,
        policy: SessionPolicy,
        max_concurrent_hashes: usize,
    ) -> Self {
        Self {
            store,
            authenticator,
            policy,
            hashing_permits: Arc::new(Semaphore::new(max_concurrent_hashes.max(1))),
        }
    }

    async fn run_blocking<F, R>(&self, work: F) -> Result<R, IdentityError>
    where
        F: FnOnce(&Authenticator) -> R + Send + 'static,
        R: Send + 'static,
    {
        let permit = Arc::clone(&self.hashing_permits)
            .acquire_owned()
            .await
            .map_err(|e| IdentityError::Unknown(format!("Hashing pool closed: {}", e)))?;

        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            work(authenticator.as_ref())
        })
            .await
            .map_err(|e| IdentityError::Unknown(format!("Hashing task failed: {}", e)))
    }

    async fn issue_for(&self, identity: &Identity) -> Result<TokenPair, IdentityError> {
        let claims = SessionClaims::for_identity(identity);
        let issued = self
            .run_blocking(move |authenticator| authenticator.issue_tokens(&claims))
            .await??;

        self.store
            .set_refresh_token_hash(&identity.id, Some(issued.refresh_token_hash))
            .await?;

        Ok(TokenPair {
            access_token: issued.access_token,
            refresh_token: issued.refresh_token,
        })
    }

    fn verify(
        &self,
        token: &str,
        kind: TokenKind,
    ) -> Result<Verified<SessionClaims>, IdentityError> {
        Ok(self.authenticator.verify_token(token, kind)?)
    }
}

#[async_trait]
impl<S> AuthServicePort for AuthService<S>
where
    S: CredentialStore,
{
    async fn register(&self, command: RegisterCommand) -> Result<PublicIdentity, IdentityError> {
        if self.store.find_by_email(&command.email).await?.is_some() {
            return Err(IdentityError::EmailAlreadyExists(
                command.email.as_str().to_string(),
            ));
        }

        let password = command.password.as_str().to_string();
        let password_hash = self
            .run_blocking(move |authenticator| authenticator.hash_secret(&password))
            .await??;

        let now = Utc::now();
        let identity = Identity {
            id: IdentityId::new(),
            email: command.email,
            role: command.role,
            password_hash,
            refresh_token_hash: None,
            token_version: 0,
            created_at: now,
            updated_at: now,
        };

        // The store's unique constraint still settles concurrent registrations
        let created = self.store.create(identity).await?;

        tracing::info!(identity_id = %created.id, role = %created.role, "Identity registered");

        Ok(PublicIdentity::from(&created))
    }

    async fn validate_credentials(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<Identity, IdentityError> {
        let password = password.to_string();

        let Some(identity) = self.store.find_by_email(email).await? else {
            self.run_blocking(move |authenticator| authenticator.verify_decoy(&password))
                .await?;
            tracing::debug!("Login attempt for unknown email");
            return Err(IdentityError::InvalidCredentials);
        };

        let stored_hash = identity.password_hash.clone();
        let verified = self
            .run_blocking(move |authenticator| authenticator.verify_secret(&password, &stored_hash))
            .await?;

        match verified {
            Ok(true) => Ok(identity),
            Ok(false) => {
                tracing::debug!(identity_id = %identity.id, "Login attempt with wrong password");
                Err(IdentityError::InvalidCredentials)
            }
            Err(e) => {
                tracing::error!(identity_id = %identity.id, "Stored password hash is unusable: {}", e);
                Err(IdentityError::InvalidCredentials)
            }
        }
    }

    async fn issue_token_pair(&self, identity: &Identity) -> Result<TokenPair, IdentityError> {
        let pair = self.issue_for(identity).await?;
        tracing::debug!(identity_id = %identity.id, "Token pair issued");
        Ok(pair)
    }

    async fn rotate_refresh_token(
        &self,
        identity: &Identity,
    ) -> Result<TokenPair, IdentityError> {
        let pair = if self.policy.rotation_bumps_token_version {
            let mut bumped = identity.clone();
            bumped.token_version = self.store.increment_token_version(&identity.id).await?;
            self.issue_for(&bumped).await?
        } else {
            self.issue_for(identity).await?
        };

        tracing::debug!(identity_id = %identity.id, "Refresh token rotated");
        Ok(pair)
    }

    async fn revoke(&self, id: &IdentityId) -> Result<(), IdentityError> {
        self.store.set_refresh_token_hash(id, None).await?;
        tracing::debug!(identity_id = %id, "Refresh token revoked");
        Ok(())
    }

    async fn authenticate_refresh(&self, refresh_token: &str) -> Result<Identity, IdentityError> {
        let verified = self.verify(refresh_token, TokenKind::Refresh)?;
        let id = IdentityId::from_string(&verified.payload.sub)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let identity = self
            .store
            .find_by_id(&id)
            .await?
            .ok_or(IdentityError::TokenRevoked)?;

        let Some(stored_hash) = identity.refresh_token_hash.clone() else {
            return Err(IdentityError::TokenRevoked);
        };

        if verified.payload.tv != identity.token_version {
            return Err(IdentityError::StaleTokenVersion);
        }

        let presented = refresh_token.to_string();
        let matches = self
            .run_blocking(move |authenticator| authenticator.verify_secret(&presented, &stored_hash))
            .await?;

        match matches {
            Ok(true) => Ok(identity),
            Ok(false) => Err(IdentityError::TokenSuperseded),
            Err(e) => {
                tracing::error!(identity_id = %identity.id, "Stored refresh token hash is unusable: {}", e);
                Err(IdentityError::TokenRevoked)
            }
        }
    }

    async fn authenticate_access(
        &self,
        access_token: &str,
    ) -> Result<PublicIdentity, IdentityError> {
        let verified = self.verify(access_token, TokenKind::Access)?;
        let resolved = verified
            .payload
            .to_public_identity()
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        if self.policy.verify_access_token_version {
            let identity = self
                .store
                .find_by_id(&resolved.id)
                .await?
                .ok_or(IdentityError::TokenRevoked)?;

            if identity.token_version != verified.payload.tv {
                return Err(IdentityError::StaleTokenVersion);
            }
        }

        Ok(resolved)
    }

    async fn invalidate_all(&self, id: &IdentityId) -> Result<(), IdentityError> {
        let token_version = self.store.increment_token_version(id).await?;
        self.store.set_refresh_token_hash(id, None).await?;

        tracing::info!(identity_id = %id, token_version, "All sessions invalidated");
        Ok(())
    }
}
