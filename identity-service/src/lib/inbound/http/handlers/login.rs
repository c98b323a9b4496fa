use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageResponseData;
use crate::domain::identity::models::EmailAddress;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, ApiSuccess<MessageResponseData>), ApiError> {
    let Json(body) = payload?;

    let email = EmailAddress::new(body.email).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if body.password.is_empty() {
        return Err(ApiError::BadRequest("Password must not be empty".to_string()));
    }

    let identity = state
        .auth_service
        .validate_credentials(&email, &body.password)
        .await?;
    let pair = state.auth_service.issue_token_pair(&identity).await?;

    tracing::info!(identity_id = %identity.id, "Login succeeded");

    Ok((
        state.session_cookies.set_pair(jar, pair),
        ApiSuccess::new(StatusCode::OK, MessageResponseData { message: "ok" }),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}
