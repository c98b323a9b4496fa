use std::time::Duration;

use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;

use crate::config::is_cookie_domain;
use crate::config::CookieConfig;
use crate::domain::identity::models::TokenPair;

pub const ACCESS_COOKIE_NAME: &str = "sr_at";
pub const REFRESH_COOKIE_NAME: &str = "sr_rt";

/// Carries the session tokens in two `HttpOnly` cookies.
///
/// `Secure` follows configuration, which also picks `SameSite` (`None` for
/// cross-site deployments over TLS, `Lax` otherwise). `Max-Age` mirrors the
/// token lifetime so the browser drops a cookie when its token expires.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    secure: bool,
    domain: Option<String>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionCookies {
    pub fn new(config: &CookieConfig, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let domain = config
            .domain
            .as_deref()
            .map(str::trim)
            .filter(|domain| !domain.is_empty() && *domain != "localhost")
            .filter(|domain| {
                // The jar drops any cookie whose header cannot be encoded
                let usable = is_cookie_domain(domain);
                if !usable {
                    tracing::warn!(domain = ?domain, "Cookie domain not usable, omitting it");
                }
                usable
            })
            .map(str::to_string);

        Self {
            secure: config.secure,
            domain,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn set_access(&self, jar: CookieJar, token: String) -> CookieJar {
        jar.add(self.session_cookie(ACCESS_COOKIE_NAME, token, self.access_ttl))
    }

    pub fn set_refresh(&self, jar: CookieJar, token: String) -> CookieJar {
        jar.add(self.session_cookie(REFRESH_COOKIE_NAME, token, self.refresh_ttl))
    }

    pub fn set_pair(&self, jar: CookieJar, pair: TokenPair) -> CookieJar {
        let jar = self.set_access(jar, pair.access_token);
        self.set_refresh(jar, pair.refresh_token)
    }

    /// Expire both cookies, whether or not the request carried them.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        let jar = jar.add(self.removal_cookie(ACCESS_COOKIE_NAME));
        jar.add(self.removal_cookie(REFRESH_COOKIE_NAME))
    }

    pub fn access_token(jar: &CookieJar) -> Option<String> {
        Self::read(jar, ACCESS_COOKIE_NAME)
    }

    pub fn refresh_token(jar: &CookieJar) -> Option<String> {
        Self::read(jar, REFRESH_COOKIE_NAME)
    }

    fn read(jar: &CookieJar, name: &str) -> Option<String> {
        jar.get(name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    fn session_cookie(&self, name: &'static str, value: String, ttl: Duration) -> Cookie<'static> {
        let secs = ttl.as_millis().div_ceil(1_000);
        let max_age = time::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX));
        let mut cookie = self.attributes(Cookie::new(name, value));
        cookie.set_max_age(max_age);
        cookie
    }

    fn attributes(&self, mut cookie: Cookie<'static>) -> Cookie<'static> {
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(if self.secure {
            SameSite::None
        } else {
            SameSite::Lax
        });
        cookie.set_path("/");
        if let Some(domain) = &self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }

    fn removal_cookie(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.attributes(Cookie::new(name, ""));
        cookie.make_removal();
        cookie
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header::SET_COOKIE;
    use axum::response::IntoResponse;

    use super::*;

    fn cookies(secure: bool, domain: Option<&str>) -> SessionCookies {
        SessionCookies::new(
            &CookieConfig {
                secure,
                domain: domain.map(str::to_string),
            },
            Duration::from_secs(900),
            Duration::from_secs(604800),
        )
    }

    fn set_cookie_headers(jar: CookieJar) -> Vec<String> {
        jar.into_response()
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_access_cookie_attributes_insecure() {
        let headers = set_cookie_headers(
            cookies(false, None).set_access(CookieJar::new(), "token".to_string()),
        );

        assert_eq!(headers.len(), 1);
        let header = &headers[0];
        assert!(header.starts_with("sr_at=token"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Max-Age=900"));
        assert!(!header.contains("Secure"));
        assert!(!header.contains("Domain"));
    }

    #[test]
    fn test_refresh_cookie_attributes_secure() {
        let headers = set_cookie_headers(
            cookies(true, Some("example.com")).set_refresh(CookieJar::new(), "token".to_string()),
        );

        let header = &headers[0];
        assert!(header.starts_with("sr_rt=token"));
        assert!(header.contains("Secure"));
        assert!(header.contains("SameSite=None"));
        assert!(header.contains("Domain=example.com"));
        assert!(header.contains("Max-Age=604800"));
    }

    #[test]
    fn test_localhost_domain_is_omitted() {
        let headers = set_cookie_headers(
            cookies(false, Some("localhost")).set_access(CookieJar::new(), "token".to_string()),
        );

        assert!(!headers[0].contains("Domain"));
    }

    #[test]
    fn test_clear_emits_both_removals_on_empty_jar() {
        let headers = set_cookie_headers(cookies(false, None).clear(CookieJar::new()));

        assert_eq!(headers.len(), 2);
        assert!(headers.iter().any(|h| h.starts_with("sr_at=;")));
        assert!(headers.iter().any(|h| h.starts_with("sr_rt=;")));
        assert!(headers.iter().all(|h| h.contains("Max-Age=0")));
    }

    #[test]
    fn test_unusable_domain_is_omitted() {
        for domain in ["bad\ndomain", "example.com; Secure"] {
            let cookies = cookies(false, Some(domain));
            let pair = TokenPair {
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
            };

            let set = set_cookie_headers(cookies.set_pair(CookieJar::new(), pair));
            assert_eq!(set.len(), 2, "{:?}", domain);
            assert!(set.iter().all(|h| !h.contains("Domain")));

            let cleared = set_cookie_headers(cookies.clear(CookieJar::new()));
            assert_eq!(cleared.len(), 2, "{:?}", domain);
            assert!(cleared.iter().all(|h| !h.contains("Domain") && h.contains("Path=/")));
        }
    }

    #[test]
    fn test_sub_second_ttl_rounds_max_age_up() {
        let cookies = SessionCookies::new(
            &CookieConfig::default(),
            Duration::from_millis(1_500),
            Duration::from_millis(200),
        );

        let access = set_cookie_headers(cookies.set_access(CookieJar::new(), "a".to_string()));
        let refresh = set_cookie_headers(cookies.set_refresh(CookieJar::new(), "r".to_string()));

        assert!(access[0].contains("Max-Age=2"));
        assert!(refresh[0].contains("Max-Age=1"));
    }

    #[test]
    fn test_read_tokens_from_jar() {
        let jar = CookieJar::new()
            .add(Cookie::new(ACCESS_COOKIE_NAME, "access"))
            .add(Cookie::new(REFRESH_COOKIE_NAME, ""));

        assert_eq!(SessionCookies::access_token(&jar).as_deref(), Some("access"));
        assert_eq!(SessionCookies::refresh_token(&jar), None);
    }
}
