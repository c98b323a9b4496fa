use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum_extra::extract::cookie::CookieJar;

use super::ApiSuccess;
use super::MessageResponseData;
use crate::domain::identity::models::IdentityId;
use crate::inbound::http::cookies::SessionCookies;
use crate::inbound::http::middleware::AuthenticatedIdentity;
use crate::inbound::http::router::AppState;

/// End the session. Always succeeds and always clears both cookies.
///
/// The identity comes from the access cookie when it is valid, otherwise
/// from a refresh cookie that is still the active one.
pub async fn logout(
    State(state): State<AppState>,
    identity: Option<Extension<AuthenticatedIdentity>>,
    jar: CookieJar,
) -> (CookieJar, ApiSuccess<MessageResponseData>) {
    if let Some(id) = resolve_identity_id(&state, identity, &jar).await {
        if let Err(e) = state.auth_service.revoke(&id).await {
            tracing::error!(identity_id = %id, "Failed to revoke refresh token on logout: {}", e);
        } else {
            tracing::info!(identity_id = %id, "Logged out");
        }
    }

    (
        state.session_cookies.clear(jar),
        ApiSuccess::new(StatusCode::OK, MessageResponseData { message: "logged out" }),
    )
}

async fn resolve_identity_id(
    state: &AppState,
    identity: Option<Extension<AuthenticatedIdentity>>,
    jar: &CookieJar,
) -> Option<IdentityId> {
    if let Some(Extension(identity)) = identity {
        return Some(identity.id);
    }

    let refresh_token = SessionCookies::refresh_token(jar)?;
    match state.auth_service.authenticate_refresh(&refresh_token).await {
        Ok(identity) => Some(identity.id),
        Err(e) => {
            tracing::debug!("Logout without a usable session: {}", e);
            None
        }
    }
}
