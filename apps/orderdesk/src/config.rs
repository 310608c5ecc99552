//! Application configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use orderdesk_db::DbConfig;

const DATABASE_PATH: &str = "ORDERDESK_DATABASE_PATH";
const MAX_CONNECTIONS: &str = "ORDERDESK_MAX_CONNECTIONS";
const CONNECT_TIMEOUT_SECS: &str = "ORDERDESK_CONNECT_TIMEOUT_SECS";
const RUN_MIGRATIONS: &str = "ORDERDESK_RUN_MIGRATIONS";

/// OrderDesk configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file (`:memory:` for a throwaway database)
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection
    pub connect_timeout_secs: u64,

    /// Apply pending migrations on startup
    pub run_migrations: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from("./orderdesk.db"),
            max_connections: 5,
            connect_timeout_secs: 30,
            run_migrations: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from any key lookup. `load` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let database_path = match lookup(DATABASE_PATH) {
            Some(path) if path.trim().is_empty() => {
                return Err(ConfigError::InvalidValue(DATABASE_PATH.to_string()))
            }
            Some(path) => PathBuf::from(path.trim()),
            None => defaults.database_path,
        };

        let config = AppConfig {
            database_path,
            max_connections: parse_or(&lookup, MAX_CONNECTIONS, defaults.max_connections)?,
            connect_timeout_secs: parse_or(
                &lookup,
                CONNECT_TIMEOUT_SECS,
                defaults.connect_timeout_secs,
            )?,
            run_migrations: parse_or(&lookup, RUN_MIGRATIONS, defaults.run_migrations)?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(MAX_CONNECTIONS.to_string()));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        if self.database_path.as_os_str() == ":memory:" {
            return DbConfig::in_memory().run_migrations(self.run_migrations);
        }

        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .run_migrations(self.run_migrations)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database_path, PathBuf::from("./orderdesk.db"));
        assert_eq!(config.max_connections, 5);
        assert!(config.run_migrations);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("ORDERDESK_DATABASE_PATH", "/var/lib/orderdesk/data.db"),
            ("ORDERDESK_MAX_CONNECTIONS", " 8 "),
            ("ORDERDESK_CONNECT_TIMEOUT_SECS", "5"),
            ("ORDERDESK_RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/orderdesk/data.db"));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.connect_timeout_secs, 5);
        assert!(!config.run_migrations);

        let db = config.db_config();
        assert_eq!(db.max_connections, 8);
        assert_eq!(db.connect_timeout, Duration::from_secs(5));
        assert!(!db.run_migrations);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("ORDERDESK_MAX_CONNECTIONS", "many"),
            ("ORDERDESK_MAX_CONNECTIONS", "0"),
            ("ORDERDESK_CONNECT_TIMEOUT_SECS", "-1"),
            ("ORDERDESK_RUN_MIGRATIONS", "yes please"),
            ("ORDERDESK_DATABASE_PATH", "  "),
        ] {
            let err = AppConfig::from_lookup(lookup_from(&[(key, value)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue(ref k) if k == key),
                "{key}={value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_in_memory_path() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("ORDERDESK_DATABASE_PATH", ":memory:")]))
                .unwrap();
        assert!(config.db_config().is_in_memory());
    }
}
