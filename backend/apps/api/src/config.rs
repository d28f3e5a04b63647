//! Startup configuration
//!
//! Read once from the environment (after `.env` is loaded). Missing or
//! malformed values abort startup with a descriptive error.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::TokenConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub token_secret: String,
    pub cookie_domain: String,
    pub cookie_secure: bool,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_connect_attempts: u32,
    pub db_connect_backoff: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("database_url", &"[REDACTED]")
            .field("token_secret", &"[REDACTED]")
            .field("cookie_domain", &self.cookie_domain)
            .field("cookie_secure", &self.cookie_secure)
            .field("bind_addr", &self.bind_addr)
            .field("frontend_origins", &self.frontend_origins)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_connect_attempts", &self.db_connect_attempts)
            .field("db_connect_backoff", &self.db_connect_backoff)
            .finish()
    }
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;
        let token_secret = get("TOKEN_SECRET").context("TOKEN_SECRET must be set")?;

        let cookie_secure = match get("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).context("COOKIE_SECURE must be true or false")?,
            None => true,
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:8080")?;

        let frontend_origins = get("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let db_max_connections = parse_number(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 10)?;
        let db_connect_attempts =
            parse_number(get("DB_CONNECT_ATTEMPTS"), "DB_CONNECT_ATTEMPTS", 5)?;
        let backoff_secs =
            parse_number(get("DB_CONNECT_BACKOFF_SECS"), "DB_CONNECT_BACKOFF_SECS", 2)?;

        if db_max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if db_connect_attempts == 0 {
            bail!("DB_CONNECT_ATTEMPTS must be at least 1");
        }

        Ok(Self {
            database_url,
            token_secret,
            cookie_domain: get("COOKIE_DOMAIN").unwrap_or_default(),
            cookie_secure,
            bind_addr,
            frontend_origins,
            db_max_connections,
            db_connect_attempts,
            db_connect_backoff: Duration::from_secs(u64::from(backoff_secs)),
        })
    }

    pub fn token_config(&self) -> TokenConfig {
        let config = TokenConfig::new(self.token_secret.clone())
            .with_cookie_domain(self.cookie_domain.clone());
        if self.cookie_secure {
            config
        } else {
            config.insecure_cookies()
        }
    }
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => bail!("invalid boolean {other:?}"),
    }
}

fn parse_number(raw: Option<String>, key: &str, default: u32) -> anyhow::Result<u32> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a non-negative integer")),
        None => Ok(default),
    }
}
