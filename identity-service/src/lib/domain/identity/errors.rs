use thiserror::Error;

/// Error for IdentityId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for password policy violations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for Role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0} (expected ADMIN or USER)")]
    Unknown(String),
}

/// Top-level error for all identity and session operations
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid identity ID: {0}")]
    InvalidIdentityId(#[from] IdentityIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    // Domain-level errors
    #[error("Identity not found: {0}")]
    NotFound(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Refresh token revoked")]
    TokenRevoked,

    #[error("Refresh token superseded")]
    TokenSuperseded,

    #[error("Token version is stale")]
    StaleTokenVersion,

    // Infrastructure errors
    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl IdentityError {
    /// Whether the error means "the caller is not authenticated".
    ///
    /// All of these collapse into one indistinguishable 401 at the HTTP edge.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            IdentityError::InvalidCredentials
                | IdentityError::InvalidToken(_)
                | IdentityError::TokenExpired
                | IdentityError::TokenRevoked
                | IdentityError::TokenSuperseded
                | IdentityError::StaleTokenVersion
        )
    }
}

impl From<auth::JwtError> for IdentityError {
    fn from(err: auth::JwtError) -> Self {
        match err {
            auth::JwtError::TokenExpired => IdentityError::TokenExpired,
            auth::JwtError::InvalidToken(reason) => IdentityError::InvalidToken(reason),
            auth::JwtError::EncodingFailed(reason) => IdentityError::Unknown(reason),
        }
    }
}

impl From<auth::PasswordError> for IdentityError {
    fn from(err: auth::PasswordError) -> Self {
        IdentityError::Hashing(err.to_string())
    }
}

impl From<auth::AuthenticationError> for IdentityError {
    fn from(err: auth::AuthenticationError) -> Self {
        match err {
            auth::AuthenticationError::PasswordError(e) => e.into(),
            auth::AuthenticationError::JwtError(e) => e.into(),
        }
    }
}

impl From<anyhow::Error> for IdentityError {
    fn from(err: anyhow::Error) -> Self {
        IdentityError::Unknown(err.to_string())
    }
}
