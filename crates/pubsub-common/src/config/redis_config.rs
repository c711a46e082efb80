//! Redis connection configuration
//!
//! Loads connection settings from environment variables (and `.env` if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Redis connection settings shared by subscribers and publishers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RedisConfig {
    /// Connection URL, credentials included (e.g. `redis://:secret@localhost:6379/0`)
    pub url: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Read timeout for blocking receives; `None` blocks indefinitely.
    /// A subscriber connection that hits it must be dropped: later replies
    /// on it are discarded, so the client stops using it.
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,
    #[serde(default)]
    pub write_timeout_ms: Option<u64>,
    /// Pool size for publishing connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_max_connections() -> u32 {
    10
}

impl RedisConfig {
    /// Create a configuration for `url` with default timeouts
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: None,
            write_timeout_ms: None,
            max_connections: default_max_connections(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `REDIS_URL` is missing or a numeric variable does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    ///
    /// # Errors
    /// Same as [`RedisConfig::from_env`]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("REDIS_URL").ok_or(ConfigError::MissingVar("REDIS_URL"))?;

        Ok(Self {
            url,
            connect_timeout_ms: parse_var(&lookup, "REDIS_CONNECT_TIMEOUT_MS")?
                .unwrap_or_else(default_connect_timeout_ms),
            read_timeout_ms: parse_var(&lookup, "REDIS_READ_TIMEOUT_MS")?,
            write_timeout_ms: parse_var(&lookup, "REDIS_WRITE_TIMEOUT_MS")?,
            max_connections: parse_var(&lookup, "REDIS_MAX_CONNECTIONS")?
                .unwrap_or_else(default_max_connections),
        })
    }

    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = Some(duration_to_ms(timeout));
        self
    }

    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout_ms = Some(duration_to_ms(timeout));
        self
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    #[must_use]
    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.map(Duration::from_millis)
    }

    /// URL with the credentials part stripped, safe for logging
    #[must_use]
    pub fn redacted_url(&self) -> &str {
        redact_url(&self.url)
    }
}

/// Strip the `user:password@` part of a connection URL
#[must_use]
pub fn redact_url(url: &str) -> &str {
    match url.rsplit_once('@') {
        Some((_, host)) => host,
        None => url,
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
    }
}

fn duration_to_ms(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
