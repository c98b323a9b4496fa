use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth::TokenSettings;
use identity_service::config::Config;
use identity_service::domain::identity::models::SessionPolicy;
use identity_service::domain::identity::service::AuthService;
use identity_service::inbound::http::cookies::SessionCookies;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::PostgresCredentialStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    let access_ttl = config.jwt.access_ttl();
    let refresh_ttl = config.jwt.refresh_ttl();
    let policy = SessionPolicy::from(&config.session);

    tracing::info!(
        http_port = config.server.http_port,
        access_ttl_secs = access_ttl.as_secs(),
        refresh_ttl_secs = refresh_ttl.as_secs(),
        cookie_secure = config.cookie.secure,
        rotation_bumps_token_version = policy.rotation_bumps_token_version,
        verify_access_token_version = policy.verify_access_token_version,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = PasswordHasher::new(config.password.hashing_cost())?;
    let token_codec = TokenCodec::new(
        TokenSettings {
            secret: config.jwt.access_secret.as_bytes(),
            ttl: access_ttl,
        },
        TokenSettings {
            secret: config.jwt.refresh_secret.as_bytes(),
            ttl: refresh_ttl,
        },
    );
    let authenticator = Arc::new(Authenticator::new(password_hasher, token_codec)?);

    let credential_store = Arc::new(PostgresCredentialStore::new(pg_pool.clone()));
    let auth_service = Arc::new(AuthService::new(
        credential_store,
        authenticator,
        policy,
        config.password.max_concurrent_hashes,
    ));
    let session_cookies = SessionCookies::new(&config.cookie, access_ttl, refresh_ttl);

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, session_cookies);
    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pg_pool.close().await;
    tracing::info!("Server exited, database pool closed");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
