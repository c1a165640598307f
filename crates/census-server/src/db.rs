//! Connection pool setup

use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Database configuration error: {0}. Check DATABASE_URL or the DB_* variables.")]
    Config(String),

    #[error("Migration failed: {0}")]
    Migrate(#[from] MigrateError),
}

pub type DbResult<T> = Result<T, DbError>;

/// Connection target from `DATABASE_URL`, or from the discrete `DB_*` parts
pub fn connect_options(config: &DatabaseConfig) -> DbResult<PgConnectOptions> {
    if let Some(ref url) = config.url {
        return url
            .parse()
            .map_err(|e: sqlx::Error| DbError::Config(e.to_string()));
    }

    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name);
    if let Some(ref user) = config.user {
        options = options.username(user);
    }
    if let Some(ref password) = config.password {
        options = options.password(password);
    }
    Ok(options)
}

/// Build the pool shared by request handlers and background ingestion runs
pub async fn create_pool(config: &DatabaseConfig) -> DbResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect_with(connect_options(config)?)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> DbResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

pub async fn health_check(pool: &PgPool) -> DbResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(DbError::from)
}
