use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::cookies::SessionCookies;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::me::me;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::middleware::enforce_roles;
use super::middleware::resolve_identity;
use super::middleware::RouteRoles;
use crate::domain::identity::models::Role;
use crate::domain::identity::ports::AuthServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub session_cookies: Arc<SessionCookies>,
    pub route_roles: Arc<RouteRoles>,
}

/// Role requirements of the auth routes.
pub fn auth_route_roles() -> RouteRoles {
    RouteRoles::new().require(Method::GET, "/auth/me", &[Role::Admin, Role::User])
}

pub fn create_router(
    auth_service: Arc<dyn AuthServicePort>,
    session_cookies: SessionCookies,
) -> Router {
    let state = AppState {
        auth_service,
        session_cookies: Arc::new(session_cookies),
        route_roles: Arc::new(auth_route_roles()),
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            // Headers are left out: they carry the session cookies
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        // Layers run bottom-up: the identity is resolved before roles are checked
        .route_layer(middleware::from_fn_with_state(state.clone(), enforce_roles))
        .route_layer(middleware::from_fn_with_state(state.clone(), resolve_identity))
        .layer(trace_layer)
        .with_state(state)
}
