use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::HashingCost;
use auth::PasswordHasher;
use auth::TokenCodec;
use auth::TokenSettings;
use identity_service::config::CookieConfig;
use identity_service::domain::identity::models::SessionPolicy;
use identity_service::domain::identity::service::AuthService;
use identity_service::inbound::http::cookies::SessionCookies;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryCredentialStore;
use serde_json::json;

pub const ACCESS_SECRET: &[u8] = b"test-access-secret-for-jwt-signing-32-bytes";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-for-jwt-signing-32-bytes";

/// Test application that spawns a real server over an in-memory store
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(SessionPolicy::default()).await
    }

    pub async fn spawn_with(policy: SessionPolicy) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let access_ttl = Duration::from_secs(900);
        let refresh_ttl = Duration::from_secs(604800);

        let token_codec = TokenCodec::new(
            TokenSettings {
                secret: ACCESS_SECRET,
                ttl: access_ttl,
            },
            TokenSettings {
                secret: REFRESH_SECRET,
                ttl: refresh_ttl,
            },
        );
        let password_hasher =
            PasswordHasher::new(HashingCost::MINIMAL).expect("Failed to create password hasher");
        let authenticator = Arc::new(
            Authenticator::new(password_hasher, token_codec)
                .expect("Failed to create authenticator"),
        );

        let auth_service = Arc::new(AuthService::new(
            Arc::new(InMemoryCredentialStore::new()),
            authenticator,
            policy,
            4,
        ));
        let session_cookies =
            SessionCookies::new(&CookieConfig::default(), access_ttl, refresh_ttl);

        let router = create_router(auth_service, session_cookies);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: Self::client(),
        }
    }

    /// Fresh client with its own cookie store
    pub fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create reqwest client")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/auth/register")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// All `Set-Cookie` header values of a response
pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Value of the named cookie in the `Set-Cookie` headers of a response
pub fn cookie_value(response: &reqwest::Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response).into_iter().find_map(|header| {
        header
            .strip_prefix(&prefix)
            .and_then(|rest| rest.split(';').next())
            .map(str::to_string)
    })
}
