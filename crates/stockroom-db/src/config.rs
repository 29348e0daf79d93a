//! Environment configuration for the database layer.
//!
//! Every variable is optional and falls back to the [`DbConfig::new`]
//! default.
//!
//! | Variable                              | Default          |
//! |---------------------------------------|------------------|
//! | `STOCKROOM_DB_PATH`                   | `./stockroom.db` |
//! | `STOCKROOM_DB_MAX_CONNECTIONS`        | `5`              |
//! | `STOCKROOM_DB_MIN_CONNECTIONS`        | `1`              |
//! | `STOCKROOM_DB_ACQUIRE_TIMEOUT_SECS`   | `30`             |
//! | `STOCKROOM_DB_IDLE_TIMEOUT_SECS`      | `600`            |
//! | `STOCKROOM_DB_RUN_MIGRATIONS`         | `true`           |
//! | `STOCKROOM_QUERY_TIMEOUT_MS`          | unset (none)     |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::pool::DbConfig;

pub const DEFAULT_DB_PATH: &str = "./stockroom.db";

pub const ENV_DB_PATH: &str = "STOCKROOM_DB_PATH";
pub const ENV_MAX_CONNECTIONS: &str = "STOCKROOM_DB_MAX_CONNECTIONS";
pub const ENV_MIN_CONNECTIONS: &str = "STOCKROOM_DB_MIN_CONNECTIONS";
pub const ENV_ACQUIRE_TIMEOUT_SECS: &str = "STOCKROOM_DB_ACQUIRE_TIMEOUT_SECS";
pub const ENV_IDLE_TIMEOUT_SECS: &str = "STOCKROOM_DB_IDLE_TIMEOUT_SECS";
pub const ENV_RUN_MIGRATIONS: &str = "STOCKROOM_DB_RUN_MIGRATIONS";
pub const ENV_QUERY_TIMEOUT_MS: &str = "STOCKROOM_QUERY_TIMEOUT_MS";

impl DbConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        DbConfig::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` (environment-free for tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(ENV_DB_PATH).unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let mut config = DbConfig::new(path);

        if let Some(max) = parse(&lookup, ENV_MAX_CONNECTIONS)? {
            config = config.max_connections(max);
        }
        if let Some(min) = parse(&lookup, ENV_MIN_CONNECTIONS)? {
            config = config.min_connections(min);
        }
        if let Some(secs) = parse(&lookup, ENV_ACQUIRE_TIMEOUT_SECS)? {
            config = config.acquire_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = parse(&lookup, ENV_IDLE_TIMEOUT_SECS)? {
            config = config.idle_timeout(Duration::from_secs(secs));
        }
        if let Some(run) = parse(&lookup, ENV_RUN_MIGRATIONS)? {
            config = config.run_migrations(run);
        }
        if let Some(ms) = parse(&lookup, ENV_QUERY_TIMEOUT_MS)? {
            config = config.query_timeout(Duration::from_millis(ms));
        }

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(ENV_MAX_CONNECTIONS.to_string()));
        }
        if config.min_connections > config.max_connections {
            return Err(ConfigError::Inconsistent(format!(
                "{} ({}) exceeds {} ({})",
                ENV_MIN_CONNECTIONS,
                config.min_connections,
                ENV_MAX_CONNECTIONS,
                config.max_connections
            )));
        }

        Ok(config)
    }
}

fn parse<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Inconsistent configuration: {0}")]
    Inconsistent(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DbConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_path.to_str(), Some(DEFAULT_DB_PATH));
        assert_eq!(config.max_connections, 5);
        assert!(config.run_migrations);
        assert_eq!(config.query_timeout, None);
    }

    #[test]
    fn test_overrides() {
        let config = DbConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/var/lib/stockroom.db"),
            (ENV_MAX_CONNECTIONS, "12"),
            (ENV_RUN_MIGRATIONS, "false"),
            (ENV_QUERY_TIMEOUT_MS, "250"),
        ]))
        .unwrap();

        assert_eq!(config.database_path.to_str(), Some("/var/lib/stockroom.db"));
        assert_eq!(config.max_connections, 12);
        assert!(!config.run_migrations);
        assert_eq!(config.query_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_invalid_values() {
        let err = DbConfig::from_lookup(lookup(&[(ENV_MAX_CONNECTIONS, "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == ENV_MAX_CONNECTIONS));

        assert!(DbConfig::from_lookup(lookup(&[(ENV_MAX_CONNECTIONS, "0")])).is_err());
        let inverted = lookup(&[(ENV_MIN_CONNECTIONS, "9"), (ENV_MAX_CONNECTIONS, "2")]);
        assert!(matches!(
            DbConfig::from_lookup(inverted),
            Err(ConfigError::Inconsistent(_))
        ));
    }
}
