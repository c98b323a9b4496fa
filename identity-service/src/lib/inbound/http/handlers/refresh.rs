use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use super::ApiError;
use super::ApiSuccess;
use super::MessageResponseData;
use crate::inbound::http::cookies::SessionCookies;
use crate::inbound::http::router::AppState;

/// Exchange the refresh cookie for a new token pair.
///
/// The presented refresh token stops working once this succeeds.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<MessageResponseData>), ApiError> {
    let refresh_token = SessionCookies::refresh_token(&jar).ok_or(ApiError::Unauthorized)?;

    let identity = state
        .auth_service
        .authenticate_refresh(&refresh_token)
        .await?;
    let pair = state.auth_service.rotate_refresh_token(&identity).await?;

    Ok((
        state.session_cookies.set_pair(jar, pair),
        ApiSuccess::new(StatusCode::OK, MessageResponseData { message: "refreshed" }),
    ))
}
