//! Configuration management for the server.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default upstream page carrying the location payload.
pub const DEFAULT_SOURCE_URL: &str = "https://www.tesla.com/findus";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Upper bound on pooled database connections
    pub database_max_connections: u32,
    /// Page the scrape source fetches
    pub source_url: String,
    /// Request timeout for the scrape source
    pub source_timeout: Duration,
    /// Delay between scheduled sync passes
    pub sync_interval: Duration,
    /// Run a pass as soon as the server starts
    pub sync_on_start: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?;

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;
        let source_url = lookup("SOURCE_URL").unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
        let source_timeout = Duration::from_secs(parse_or(&lookup, "SOURCE_TIMEOUT_SECS", 30)?);
        let sync_interval = Duration::from_secs(parse_or(&lookup, "SYNC_INTERVAL_SECS", 86_400)?);
        let sync_on_start = parse_or(&lookup, "SYNC_ON_START", true)?;

        if sync_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "SYNC_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            source_url,
            source_timeout,
            sync_interval,
            sync_on_start,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid {name} value: {value}")]
    InvalidValue { name: &'static str, value: String },
}
