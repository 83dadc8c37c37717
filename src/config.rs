use dotenvy::dotenv;
use std::env;
use thiserror::Error;

use crate::session::MAX_SESSION_TTL_HOURS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be a valid {1}")]
    Invalid(&'static str, &'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// `None` means a random per-process secret is generated at startup.
    pub session_secret: Option<String>,
    pub session_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv().is_ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match get("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT", "u16 number"))?,
            None => 5000,
        };

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("DATABASE_MAX_CONNECTIONS", "u32 number"))?,
            None => 5,
        };

        let session_ttl_hours = match get("SESSION_TTL_HOURS") {
            Some(v) => v
                .parse()
                .ok()
                .filter(|h: &i64| (1..=MAX_SESSION_TTL_HOURS).contains(h))
                .ok_or(ConfigError::Invalid(
                    "SESSION_TTL_HOURS",
                    "number of hours between 1 and 87600",
                ))?,
            None => 24,
        };

        Ok(Self {
            host,
            port,
            database_url: get("DATABASE_URL"),
            max_connections,
            session_secret: get("SESSION_SECRET"),
            session_ttl_hours,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
