//! Configuration module for environment variables and application settings

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::database::connection::masked_url;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Server configuration
    pub server: ServerConfig,

    /// Token and demo-mode configuration
    pub auth: AuthConfig,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: usize,
    /// Upper bound for establishing a new pooled connection
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer
    pub allowed_origins: Vec<String>,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Session token lifetime, 7 days unless overridden
    pub token_lifetime: chrono::Duration,
    /// How long the availability probe waits for the credential store
    pub probe_timeout: Duration,
    /// Fall back to demo mode when registration hits a non-connectivity store error
    pub demo_on_store_error: bool,
    pub demo_cache_capacity: usize,
    pub demo_idle_ttl: Duration,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &masked_url(&self.url))
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_lifetime", &self.token_lifetime)
            .field("probe_timeout", &self.probe_timeout)
            .field("demo_on_store_error", &self.demo_on_store_error)
            .field("demo_cache_capacity", &self.demo_cache_capacity)
            .field("demo_idle_ttl", &self.demo_idle_ttl)
            .finish()
    }
}

const DEFAULT_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://localhost:5174",
    "http://localhost:3000",
];

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// A missing or blank `JWT_SECRET` is fatal: the server must not start
    /// without a signing key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.trim().is_empty())
            .ok_or_else(|| anyhow!("JWT_SECRET environment variable is required"))?;

        let url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow!("DATABASE_URL environment variable is required"))?;

        let token_days: i64 = parse_or(&lookup, "JWT_EXPIRES_IN_DAYS", 7)?;
        if token_days <= 0 {
            anyhow::bail!("JWT_EXPIRES_IN_DAYS must be a positive number of days");
        }

        let mut allowed_origins: Vec<String> =
            DEFAULT_ORIGINS.iter().map(|origin| origin.to_string()).collect();
        if let Some(frontend) = lookup("FRONTEND_URL").filter(|url| !url.trim().is_empty()) {
            allowed_origins.insert(0, frontend.trim().trim_end_matches('/').to_string());
        }

        Ok(Self {
            database: DatabaseConfig {
                url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
                connect_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "DATABASE_CONNECT_TIMEOUT_SECS",
                    5,
                )?),
            },

            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "PORT", 5000)?,
                allowed_origins,
            },

            auth: AuthConfig {
                jwt_secret,
                token_lifetime: chrono::Duration::days(token_days),
                probe_timeout: Duration::from_millis(parse_or(
                    &lookup,
                    "DB_PROBE_TIMEOUT_MS",
                    2000,
                )?),
                demo_on_store_error: parse_or(&lookup, "AUTH_DEMO_ON_STORE_ERROR", true)?,
                demo_cache_capacity: parse_or(&lookup, "DEMO_CACHE_CAPACITY", 1000)?,
                demo_idle_ttl: Duration::from_secs(parse_or(&lookup, "DEMO_IDLE_TTL_SECS", 3600)?),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://app@localhost/vtechsoft"),
        ]))
        .unwrap();

        assert_eq!(config.auth.token_lifetime, chrono::Duration::days(7));
        assert_eq!(config.auth.probe_timeout, Duration::from_secs(2));
        assert!(config.auth.demo_on_store_error);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.server.allowed_origins.len(), DEFAULT_ORIGINS.len());
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "postgres://app@localhost/vtechsoft",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));

        let blank = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "   "),
            ("DATABASE_URL", "postgres://app@localhost/vtechsoft"),
        ]));
        assert!(blank.is_err());
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://app@localhost/vtechsoft"),
            ("JWT_EXPIRES_IN_DAYS", "1"),
            ("AUTH_DEMO_ON_STORE_ERROR", "false"),
            ("FRONTEND_URL", "https://vtechsoft.example/"),
        ]))
        .unwrap();
        assert_eq!(config.auth.token_lifetime, chrono::Duration::days(1));
        assert!(!config.auth.demo_on_store_error);
        assert_eq!(config.server.allowed_origins[0], "https://vtechsoft.example");

        let bad = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://app@localhost/vtechsoft"),
            ("PORT", "not-a-port"),
        ]));
        assert!(bad.unwrap_err().to_string().contains("PORT"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "super-private"),
            ("DATABASE_URL", "postgres://app:hunter2@db/vtech"),
        ]))
        .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-private"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("postgres://db:5432/vtech"));
    }
}
