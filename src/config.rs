//! # Process configuration
//!
//! Read once at startup from the environment (after `.env` is loaded by `dotenvy`).
//!
//! ## Environment Variables
//!
//! - `MONGODB_URI`: default connection string (optional)
//! - `PORT`: HTTP port, defaults to `3001`
//! - `APP_ENV`: environment label reported by the health check, defaults to `development`
//! - `DB_PROBE_TIMEOUT_SECS`: server selection timeout for status probes, defaults to `3`
//! - `DB_CONNECT_TIMEOUT_SECS`: server selection timeout for the shared client, defaults to `5`
//! - `DB_FALLBACK_NAME`: database used when the connection string names none
//! - `RUST_LOG`: log filter, defaults to `info`

use std::fmt;
use std::time::Duration;

use crate::errors::ServiceError;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_ENV: &str = "development";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_DB_NAME: &str = "domain_manager";

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// A connection string identifying which database instance to reach.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionTarget(String);

impl ConnectionTarget {
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scheme and host list only; credentials, path and options are dropped.
    pub fn redacted(&self) -> String {
        let Some((scheme, rest)) = self.0.split_once("://") else {
            return "<unparseable>".to_string();
        };

        // Userinfo ends at the last '@', which may follow an unescaped '/' or '?'.
        let after_userinfo = rest.rsplit_once('@').map_or(rest, |(_, tail)| tail);
        let hosts = after_userinfo.split(['/', '?']).next().unwrap_or_default();

        format!("{scheme}://{hosts}")
    }
}

impl fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionTarget").field(&self.redacted()).finish()
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongodb_uri: Option<ConnectionTarget>,
    pub port: u16,
    pub env: String,
    pub log_level: String,
    pub probe_timeout: Duration,
    pub connect_timeout: Duration,
    pub fallback_db_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mongodb_uri: None,
            port: DEFAULT_PORT,
            env: DEFAULT_ENV.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            fallback_db_name: DEFAULT_DB_NAME.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Malformed numbers fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            mongodb_uri: lookup("MONGODB_URI").and_then(|v| ConnectionTarget::parse(&v)),
            port: lookup("PORT")
                .and_then(|v| v.trim().parse::<u16>().ok())
                .unwrap_or(defaults.port),
            env: lookup("APP_ENV")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.env),
            log_level: lookup("RUST_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_level),
            probe_timeout: secs("DB_PROBE_TIMEOUT_SECS", defaults.probe_timeout),
            connect_timeout: secs("DB_CONNECT_TIMEOUT_SECS", defaults.connect_timeout),
            fallback_db_name: lookup("DB_FALLBACK_NAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.fallback_db_name),
        }
    }

    /// An explicit non-blank value wins over the configured default.
    pub fn resolve_target(&self, explicit: Option<&str>) -> Result<ConnectionTarget, ServiceError> {
        explicit
            .and_then(ConnectionTarget::parse)
            .or_else(|| self.mongodb_uri.clone())
            .ok_or_else(|| {
                ServiceError::Configuration("No MongoDB connection string provided".to_string())
            })
    }
}
