use thiserror::Error;

use crate::domain::identity::models::PublicIdentity;
use crate::domain::identity::models::Role;

/// Outcome of a denied role check.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Insufficient role")]
    Forbidden,
}

/// Decide whether `identity` may access something guarded by `required`.
///
/// An empty requirement admits everyone, including anonymous callers.
/// Membership is flat: `ADMIN` does not imply `USER`.
///
/// # Errors
/// * `Unauthenticated` - Roles are required and no identity was resolved
/// * `Forbidden` - The identity's role is not in `required`
pub fn authorize(identity: Option<&PublicIdentity>, required: &[Role]) -> Result<(), AccessDenied> {
    if required.is_empty() {
        return Ok(());
    }

    let identity = identity.ok_or(AccessDenied::Unauthenticated)?;

    if required.contains(&identity.role) {
        Ok(())
    } else {
        Err(AccessDenied::Forbidden)
    }
}
