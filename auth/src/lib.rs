//! Authentication utilities library
//!
//! Provides reusable session-token infrastructure:
//! - Secret hashing (Argon2id) with configurable cost
//! - Access/refresh token signing and validation (HS256, one secret per kind)
//! - Authentication coordination (token pair issuance + refresh token digests)
//! - Compact TTL parsing (`15m`, `7d`, ...)
//!
//! Services define their own token payloads and persistence; this crate only
//! knows about bytes, secrets and timestamps.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{HashingCost, PasswordHasher};
//!
//! let hasher = PasswordHasher::new(HashingCost::MINIMAL).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Session Tokens
//! ```
//! use std::time::Duration;
//! use auth::{TokenCodec, TokenKind, TokenSettings, Verified};
//!
//! let codec = TokenCodec::new(
//!     TokenSettings { secret: b"access_secret_at_least_32_bytes_long!", ttl: Duration::from_secs(900) },
//!     TokenSettings { secret: b"refresh_secret_at_least_32_bytes_long", ttl: Duration::from_secs(604800) },
//! );
//! let token = codec.sign(TokenKind::Access, &serde_json::json!({ "sub": "user123" })).unwrap();
//! let verified: Verified<serde_json::Value> = codec.verify(&token, TokenKind::Access).unwrap();
//! assert_eq!(verified.payload["sub"], "user123");
//! assert!(codec.verify::<serde_json::Value>(&token, TokenKind::Refresh).is_err());
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod ttl;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::IssuedTokens;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenCodec;
pub use jwt::TokenKind;
pub use jwt::TokenSettings;
pub use jwt::Verified;
pub use password::HashingCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use ttl::parse_ttl;
pub use ttl::ttl_or;
pub use ttl::DEFAULT_ACCESS_TTL;
pub use ttl::DEFAULT_REFRESH_TTL;
pub use ttl::MAX_TTL;
pub use ttl::MIN_TTL;
