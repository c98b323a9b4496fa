use axum::http::StatusCode;
use axum::Extension;

use super::register::IdentityResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedIdentity;

pub async fn me(
    identity: Option<Extension<AuthenticatedIdentity>>,
) -> Result<ApiSuccess<IdentityResponseData>, ApiError> {
    let Extension(identity) = identity.ok_or(ApiError::Unauthorized)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        IdentityResponseData {
            id: identity.id.to_string(),
            email: identity.email.as_str().to_string(),
            role: identity.role,
        },
    ))
}
