//! Token Configuration

use std::fmt;

use chrono::Duration;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Token service configuration
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC signing secret shared by both tokens
    pub secret: String,
    /// Cookie `Domain` attribute; omitted when empty
    pub cookie_domain: String,
    /// Access token lifetime (72 hours)
    pub access_ttl: Duration,
    /// Refresh token lifetime (72 hours x 24)
    pub refresh_ttl: Duration,
    /// Cookie `Max-Age` for both cookies (20 days)
    pub cookie_max_age: Duration,
    pub access_cookie_name: String,
    pub refresh_cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            cookie_domain: String::new(),
            access_ttl: Duration::hours(72),
            refresh_ttl: Duration::hours(72 * 24),
            cookie_max_age: Duration::hours(20 * 24),
            access_cookie_name: "session".to_string(),
            refresh_cookie_name: "refreshToken".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
        }
    }
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = domain.into();
        self
    }

    /// Allow plain-HTTP cookies (local development)
    pub fn insecure_cookies(mut self) -> Self {
        self.cookie_secure = false;
        self
    }

    pub(crate) fn cookie_domain(&self) -> Option<String> {
        let domain = self.cookie_domain.trim();
        (!domain.is_empty()).then(|| domain.to_string())
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("cookie_domain", &self.cookie_domain)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("cookie_max_age", &self.cookie_max_age)
            .field("access_cookie_name", &self.access_cookie_name)
            .field("refresh_cookie_name", &self.refresh_cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .finish()
    }
}
