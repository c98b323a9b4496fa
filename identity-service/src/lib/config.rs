use std::env;
use std::time::Duration;

use auth::HashingCost;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::identity::models::SessionPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub cookie: CookieConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Option<String>,
    pub refresh_ttl: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CookieConfig {
    #[serde(default)]
    pub secure: bool,
    pub domain: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub max_concurrent_hashes: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub rotation_bumps_token_version: bool,
    #[serde(default)]
    pub verify_access_token_version: bool,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let cost = HashingCost::default();
        Self {
            memory_kib: cost.memory_kib,
            iterations: cost.iterations,
            parallelism: cost.parallelism,
            max_concurrent_hashes: 4,
        }
    }
}

impl PasswordConfig {
    pub fn hashing_cost(&self) -> HashingCost {
        HashingCost {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        }
    }
}

impl JwtConfig {
    /// Access token lifetime; unparseable or out-of-range values fall back to 15 minutes.
    pub fn access_ttl(&self) -> Duration {
        resolve_ttl("jwt.access_ttl", self.access_ttl.as_deref(), auth::DEFAULT_ACCESS_TTL)
    }

    /// Refresh token lifetime; unparseable or out-of-range values fall back to 7 days.
    pub fn refresh_ttl(&self) -> Duration {
        resolve_ttl("jwt.refresh_ttl", self.refresh_ttl.as_deref(), auth::DEFAULT_REFRESH_TTL)
    }
}

fn resolve_ttl(key: &str, expr: Option<&str>, fallback: Duration) -> Duration {
    if let Some(raw) = expr {
        if auth::parse_ttl(raw).is_none() {
            tracing::warn!(key, value = raw, fallback_secs = fallback.as_secs(), "Unusable TTL, using default");
        }
    }
    auth::ttl_or(expr, fallback)
}

impl From<&SessionConfig> for SessionPolicy {
    fn from(config: &SessionConfig) -> Self {
        SessionPolicy {
            rotation_bumps_token_version: config.rotation_bumps_token_version,
            verify_access_token_version: config.verify_access_token_version,
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__ACCESS_SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__REFRESH_TTL=30d overrides jwt.refresh_ttl
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject configurations that would weaken token separation or produce
    /// cookies that cannot be sent.
    ///
    /// # Errors
    /// * `ConfigError::Message` - A secret is empty, both kinds share one secret,
    ///   or `cookie.domain` is not a plain host name
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.access_secret.is_empty() || self.jwt.refresh_secret.is_empty() {
            return Err(ConfigError::Message(
                "jwt.access_secret and jwt.refresh_secret must be set".to_string(),
            ));
        }

        if self.jwt.access_secret == self.jwt.refresh_secret {
            return Err(ConfigError::Message(
                "jwt.access_secret and jwt.refresh_secret must differ".to_string(),
            ));
        }

        if let Some(domain) = self.cookie.domain.as_deref().map(str::trim) {
            if !domain.is_empty() && !is_cookie_domain(domain) {
                return Err(ConfigError::Message(format!(
                    "cookie.domain {:?} is not a valid host name",
                    domain
                )));
            }
        }

        Ok(())
    }
}

/// Host names only: ASCII letters, digits, `.`, `-` and `_`.
pub fn is_cookie_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}
