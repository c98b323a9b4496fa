use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::ports::CredentialStore;
use crate::identity::errors::IdentityError;

/// Process-local credential store.
///
/// Each operation holds the write lock for its whole duration, which gives
/// the same single-row atomicity as the Postgres store.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    identities: RwLock<HashMap<IdentityId, Identity>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, identity: Identity) -> Result<Identity, IdentityError> {
        let mut identities = self.identities.write().await;

        if identities.values().any(|existing| existing.email == identity.email) {
            return Err(IdentityError::EmailAlreadyExists(
                identity.email.as_str().to_string(),
            ));
        }

        identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, IdentityError> {
        Ok(self.identities.read().await.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Identity>, IdentityError> {
        Ok(self
            .identities
            .read()
            .await
            .values()
            .find(|identity| &identity.email == email)
            .cloned())
    }

    async fn set_refresh_token_hash(
        &self,
        id: &IdentityId,
        hash: Option<String>,
    ) -> Result<(), IdentityError> {
        let mut identities = self.identities.write().await;

        match identities.get_mut(id) {
            Some(identity) => {
                identity.refresh_token_hash = hash;
                identity.updated_at = Utc::now();
                Ok(())
            }
            None if hash.is_none() => Ok(()),
            None => Err(IdentityError::NotFound(id.to_string())),
        }
    }

    async fn increment_token_version(&self, id: &IdentityId) -> Result<i64, IdentityError> {
        let mut identities = self.identities.write().await;

        let identity = identities
            .get_mut(id)
            .ok_or_else(|| IdentityError::NotFound(id.to_string()))?;
        identity.token_version += 1;
        identity.updated_at = Utc::now();

        Ok(identity.token_version)
    }
}
