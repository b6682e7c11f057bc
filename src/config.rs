use std::{env, path::PathBuf};

use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
// ten years
const MAX_LIFESPAN_HOURS: i64 = 87_600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unable to read env var {0}")]
    Missing(&'static str),
    #[error("invalid value for env var {key}: {value}; {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Signing material for access tokens.
#[derive(Clone)]
pub struct TokenConfig {
    pub signing_key: Vec<u8>,
    pub lifespan_hours: i64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("signing_key", &"<redacted>")
            .field("lifespan_hours", &self.lifespan_hours)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
    pub auto_migrate: bool,
    /// Rolling JSON log file written next to stdout logging.
    pub log_file: Option<PathBuf>,
    pub token: TokenConfig,
}

impl AppConfig {
    /// Reads the process environment. Callers load `.env` beforehand if they want it.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let token = TokenConfig::from_lookup(&get)?;

        let port = match get("SERVER_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "SERVER_PORT",
                value: raw,
                reason: "must be a port number",
            })?,
            None => DEFAULT_PORT,
        };

        // every connection to an in-memory database opens its own empty database
        let in_memory = is_in_memory(&database_url);
        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 1 && in_memory => {
                    return Err(ConfigError::Invalid {
                        key: "DATABASE_MAX_CONNECTIONS",
                        value: raw,
                        reason: "an in-memory database allows a single connection",
                    })
                }
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "DATABASE_MAX_CONNECTIONS",
                        value: raw,
                        reason: "must be a positive integer",
                    })
                }
            },
            None if in_memory => 1,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(AppConfig {
            database_url,
            max_connections,
            port,
            auto_migrate: get("AUTO_MIGRATE").as_deref() == Some("true"),
            log_file: get("LOG_FILE").map(PathBuf::from),
            token,
        })
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

impl TokenConfig {
    fn from_lookup<F>(get: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = get("TOKEN_HOUR_LIFESPAN").ok_or(ConfigError::Missing("TOKEN_HOUR_LIFESPAN"))?;
        let lifespan_hours = match raw.parse::<i64>() {
            Ok(h) if (1..=MAX_LIFESPAN_HOURS).contains(&h) => h,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "TOKEN_HOUR_LIFESPAN",
                    value: raw,
                    reason: "must be a whole number of hours between 1 and 87600",
                })
            }
        };

        let signing_key = get("JWT_SIGNING_KEY")
            .ok_or(ConfigError::Missing("JWT_SIGNING_KEY"))?
            .into_bytes();

        Ok(TokenConfig {
            signing_key,
            lifespan_hours,
        })
    }
}
