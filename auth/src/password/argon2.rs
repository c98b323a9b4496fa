use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Work factor applied to newly produced digests.
///
/// Digests are PHC strings that carry their own parameters, so raising the
/// cost only affects hashes produced afterwards; older digests still verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl HashingCost {
    /// Cheapest parameters Argon2 accepts. Only meant for tests.
    pub const MINIMAL: HashingCost = HashingCost {
        memory_kib: Params::MIN_M_COST,
        iterations: Params::MIN_T_COST,
        parallelism: Params::MIN_P_COST,
    };
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Argon2id digests for secrets that must never be stored in the clear.
///
/// Passwords go through it, and so do refresh tokens before they are persisted.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a new password hasher with the given work factor.
    ///
    /// # Arguments
    /// * `cost` - Argon2id memory, iteration and parallelism parameters
    ///
    /// # Errors
    /// * `InvalidCost` - Parameters are outside the ranges Argon2 accepts
    pub fn new(cost: HashingCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| PasswordError::InvalidCost(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Digest `password` under a fresh random salt, as a PHC string.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Check `password` against a stored PHC digest.
    ///
    /// Uses the parameters embedded in `hash` rather than the configured cost,
    /// and compares in constant time. A digest that does not parse is
    /// `VerificationFailed`; a mismatch is `Ok(false)`.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let stored = PasswordHash::new(hash)
            .map_err(|e| PasswordError::VerificationFailed(format!("Unparseable digest: {}", e)))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &stored)
            .is_ok())
    }
}
