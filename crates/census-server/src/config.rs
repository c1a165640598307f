//! Configuration management
//!
//! Everything comes from the environment (optionally seeded from `.env`).
//! Unparseable numeric values fall back to their defaults; structural problems
//! are reported by [`Config::validate`].

use census_common::{CommonError, Result};
use census_ingest::DEFAULT_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

pub const DEFAULT_SERVER_PORT: u16 = 3000;

pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_DB_HOST: &str = "localhost";

pub const DEFAULT_DB_PORT: u16 = 5432;

pub const DEFAULT_DB_NAME: &str = "census";

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

pub const DEFAULT_DB_MIN_CONNECTIONS: u32 = 1;

pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 10;

/// 10 minutes
pub const DEFAULT_DB_IDLE_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ingest: IngestSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Connection target and pool sizing.
///
/// `url` wins when set; otherwise the discrete `DB_*` parts are used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub name: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    /// File loaded by `POST /api/upload`; checked per request, not at startup
    pub csv_file_path: Option<PathBuf>,
    pub batch_size: usize,
}

impl Config {
    /// Load `.env` if present, then read the environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_env();
        config.validate()?;
        Ok(config)
    }

    /// Read the environment without validating
    pub fn from_env() -> Self {
        Config {
            server: ServerConfig {
                host: env_string("HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
                port: env_parse("PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_parse("SHUTDOWN_TIMEOUT", DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            database: DatabaseConfig {
                url: env_string("DATABASE_URL"),
                host: env_string("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
                port: env_parse("DB_PORT", DEFAULT_DB_PORT),
                user: env_string("DB_USER"),
                password: env_string("DB_PASSWORD"),
                name: env_string("DB_DATABASE").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
                max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
                min_connections: env_parse("DB_MIN_CONNECTIONS", DEFAULT_DB_MIN_CONNECTIONS),
                connect_timeout_secs: env_parse("DB_CONNECT_TIMEOUT", DEFAULT_DB_CONNECT_TIMEOUT_SECS),
                idle_timeout_secs: env_parse("DB_IDLE_TIMEOUT", DEFAULT_DB_IDLE_TIMEOUT_SECS),
                run_migrations: env_parse("RUN_MIGRATIONS", true),
            },
            ingest: IngestSettings {
                csv_file_path: env_string("CSV_FILE_PATH").map(PathBuf::from),
                batch_size: env_parse("INGEST_BATCH_SIZE", DEFAULT_BATCH_SIZE),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(CommonError::config("Server port must be greater than 0"));
        }

        if self.database.max_connections == 0 {
            return Err(CommonError::config("DB_MAX_CONNECTIONS must be greater than 0"));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(CommonError::config(format!(
                "DB_MIN_CONNECTIONS ({}) cannot be greater than DB_MAX_CONNECTIONS ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }

        if self.ingest.batch_size == 0 {
            return Err(CommonError::config("INGEST_BATCH_SIZE must be greater than 0"));
        }

        if self.ingest.csv_file_path.is_none() {
            tracing::warn!("CSV_FILE_PATH is not set - uploads will be rejected");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: None,
                host: DEFAULT_DB_HOST.to_string(),
                port: DEFAULT_DB_PORT,
                user: None,
                password: None,
                name: DEFAULT_DB_NAME.to_string(),
                max_connections: DEFAULT_DB_MAX_CONNECTIONS,
                min_connections: DEFAULT_DB_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DB_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DB_IDLE_TIMEOUT_SECS,
                run_migrations: true,
            },
            ingest: IngestSettings {
                csv_file_path: None,
                batch_size: DEFAULT_BATCH_SIZE,
            },
        }
    }
}

/// Set and non-blank
fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env_string(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "HOST",
        "PORT",
        "DATABASE_URL",
        "DB_HOST",
        "DB_PORT",
        "DB_USER",
        "DB_PASSWORD",
        "DB_DATABASE",
        "DB_MAX_CONNECTIONS",
        "DB_MIN_CONNECTIONS",
        "CSV_FILE_PATH",
        "INGEST_BATCH_SIZE",
        "RUN_MIGRATIONS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        clear_env();
        let config = Config::from_env();

        assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
        assert_eq!(config.database.url, None);
        assert_eq!(config.database.name, DEFAULT_DB_NAME);
        assert_eq!(config.ingest.batch_size, 1000);
        assert!(config.ingest.csv_file_path.is_none());
        assert!(config.database.run_migrations);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_reads_discrete_database_parts() {
        clear_env();
        std::env::set_var("DB_USER", "loader");
        std::env::set_var("DB_PASSWORD", "s3cret");
        std::env::set_var("DB_HOST", "db.internal");
        std::env::set_var("DB_PORT", "6543");
        std::env::set_var("DB_DATABASE", "people");
        std::env::set_var("CSV_FILE_PATH", "/data/users.csv");

        let config = Config::from_env();
        assert_eq!(config.database.user.as_deref(), Some("loader"));
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.name, "people");
        assert_eq!(config.ingest.csv_file_path, Some(PathBuf::from("/data/users.csv")));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_unparseable_numbers_fall_back() {
        clear_env();
        std::env::set_var("PORT", "eighty");
        std::env::set_var("INGEST_BATCH_SIZE", "lots");

        let config = Config::from_env();
        assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
        assert_eq!(config.ingest.batch_size, DEFAULT_BATCH_SIZE);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_blank_csv_path_is_unset() {
        clear_env();
        std::env::set_var("CSV_FILE_PATH", "  ");
        assert!(Config::from_env().ingest.csv_file_path.is_none());
        clear_env();
    }

    #[test]
    fn test_validate_rejects_bad_pool_and_batch() {
        let mut config = Config::default();
        config.database.min_connections = 20;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ingest.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }
}
