use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::ports::CredentialStore;
use crate::identity::errors::IdentityError;

const EMAIL_UNIQUE_CONSTRAINT: &str = "identities_email_key";

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    email: String,
    role: String,
    password_hash: String,
    refresh_token_hash: Option<String>,
    token_version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = IdentityError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Identity {
            id: IdentityId(row.id),
            email: EmailAddress::new(row.email)?,
            role: row.role.parse()?,
            password_hash: row.password_hash,
            refresh_token_hash: row.refresh_token_hash,
            token_version: row.token_version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> IdentityError {
    IdentityError::DatabaseError(e.to_string())
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn create(&self, identity: Identity) -> Result<Identity, IdentityError> {
        sqlx::query(
            r#"
            INSERT INTO identities
                (id, email, role, password_hash, refresh_token_hash, token_version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(identity.id.0)
        .bind(identity.email.as_str())
        .bind(identity.role.as_str())
        .bind(&identity.password_hash)
        .bind(&identity.refresh_token_hash)
        .bind(identity.token_version)
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT)
                {
                    return IdentityError::EmailAlreadyExists(identity.email.as_str().to_string());
                }
            }
            database_error(e)
        })?;

        Ok(identity)
    }

    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, IdentityError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, email, role, password_hash, refresh_token_hash, token_version, created_at, updated_at
            FROM identities
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(Identity::try_from).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Identity>, IdentityError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, email, role, password_hash, refresh_token_hash, token_version, created_at, updated_at
            FROM identities
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(Identity::try_from).transpose()
    }

    async fn set_refresh_token_hash(
        &self,
        id: &IdentityId,
        hash: Option<String>,
    ) -> Result<(), IdentityError> {
        let is_set = hash.is_some();

        let result = sqlx::query(
            r#"
            UPDATE identities
            SET refresh_token_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(hash)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if is_set && result.rows_affected() == 0 {
            return Err(IdentityError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn increment_token_version(&self, id: &IdentityId) -> Result<i64, IdentityError> {
        let token_version: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE identities
            SET token_version = token_version + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING token_version
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        token_version.ok_or_else(|| IdentityError::NotFound(id.to_string()))
    }
}
