use std::collections::HashMap;

use axum::extract::MatchedPath;
use axum::extract::Request;
use axum::extract::State;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use super::cookies::SessionCookies;
use super::handlers::ApiError;
use crate::domain::identity::authorization::authorize;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::PublicIdentity;
use crate::domain::identity::models::Role;
use crate::inbound::http::router::AppState;

/// Extension type to store the resolved caller in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub id: IdentityId,
    pub email: EmailAddress,
    pub role: Role,
}

impl From<PublicIdentity> for AuthenticatedIdentity {
    fn from(identity: PublicIdentity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            role: identity.role,
        }
    }
}

impl From<&AuthenticatedIdentity> for PublicIdentity {
    fn from(identity: &AuthenticatedIdentity) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
            role: identity.role,
        }
    }
}

/// Roles required per route, declared when the router is wired.
///
/// Routes missing from the table require nothing.
#[derive(Debug, Clone, Default)]
pub struct RouteRoles {
    rules: HashMap<(Method, String), Vec<Role>>,
}

impl RouteRoles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require one of `roles` for `method` on the route pattern `path`.
    pub fn require(mut self, method: Method, path: &str, roles: &[Role]) -> Self {
        self.rules
            .insert((method, path.to_string()), roles.to_vec());
        self
    }

    pub fn required(&self, method: &Method, path: &str) -> &[Role] {
        self.rules
            .get(&(method.clone(), path.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Middleware that resolves the access cookie into an `AuthenticatedIdentity`.
///
/// A missing or invalid cookie leaves the request anonymous; rejecting it is
/// the job of `enforce_roles`.
pub async fn resolve_identity(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = SessionCookies::access_token(&jar) {
        match state.auth_service.authenticate_access(&token).await {
            Ok(identity) => {
                req.extensions_mut()
                    .insert(AuthenticatedIdentity::from(identity));
            }
            Err(e) if e.is_authentication_failure() => {
                tracing::debug!("Ignoring unusable access cookie: {}", e);
            }
            Err(e) => return Err(ApiError::from(e)),
        }
    }

    Ok(next.run(req).await)
}

/// Middleware that applies the route's role requirement before the handler.
pub async fn enforce_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let required = state.route_roles.required(req.method(), &path);
    let identity = req
        .extensions()
        .get::<AuthenticatedIdentity>()
        .map(PublicIdentity::from);

    authorize(identity.as_ref(), required).map_err(|denied| {
        tracing::debug!(method = %req.method(), path = %path, "Access denied: {}", denied);
        ApiError::from(denied)
    })?;

    Ok(next.run(req).await)
}
