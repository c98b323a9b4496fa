pub mod cookies;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use cookies::SessionCookies;
pub use middleware::AuthenticatedIdentity;
pub use middleware::RouteRoles;
pub use router::create_router;
pub use router::AppState;
