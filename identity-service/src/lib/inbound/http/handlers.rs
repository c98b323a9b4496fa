use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::identity::authorization::AccessDenied;
use crate::identity::errors::IdentityError;

pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;
pub mod register;

/// Message returned for every authentication failure, whatever the cause.
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing credentials";

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Plain `{"message": ...}` body used by the session endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponseData {
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Conflict(String),
    Unauthorized,
    Forbidden,
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(detail) => {
                tracing::error!("Request failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Insufficient role".to_string()),
        };

        (status, Json(ApiErrorBody::new(status, message))).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        if err.is_authentication_failure() {
            tracing::debug!("Authentication failed: {}", err);
            return ApiError::Unauthorized;
        }

        match err {
            IdentityError::EmailAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            IdentityError::InvalidEmail(_)
            | IdentityError::InvalidPassword(_)
            | IdentityError::InvalidRole(_)
            | IdentityError::InvalidIdentityId(_) => ApiError::BadRequest(err.to_string()),
            // The identity disappeared between lookup and update
            IdentityError::NotFound(_) => ApiError::Unauthorized,
            _ => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl From<AccessDenied> for ApiError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated => ApiError::Unauthorized,
            AccessDenied::Forbidden => ApiError::Forbidden,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    status_code: u16,
    error: String,
    message: String,
}

impl ApiErrorBody {
    pub fn new(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            error: status_code
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_authentication_failure_maps_to_unauthorized() {
        let failures = [
            IdentityError::InvalidCredentials,
            IdentityError::InvalidToken("InvalidSignature".to_string()),
            IdentityError::TokenExpired,
            IdentityError::TokenRevoked,
            IdentityError::TokenSuperseded,
            IdentityError::StaleTokenVersion,
        ];

        for failure in failures {
            assert_eq!(ApiError::from(failure), ApiError::Unauthorized);
        }
    }

    #[test]
    fn test_store_failures_map_to_internal_error() {
        let err = ApiError::from(IdentityError::DatabaseError("pool timed out".to_string()));
        assert!(matches!(err, ApiError::InternalServerError(_)));
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ApiErrorBody::new(
            StatusCode::UNAUTHORIZED,
            UNAUTHORIZED_MESSAGE.to_string(),
        ))
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "status_code": 401,
                "error": "Unauthorized",
                "message": UNAUTHORIZED_MESSAGE,
            })
        );
    }
}
