//! Census Server Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! HTTP trigger for the census CSV loader.
//!
//! A `POST /api/upload` checks the configured file, answers `202 Accepted`
//! and loads the file into PostgreSQL on a background task. Progress and the
//! final age distribution report go to the log.
//!
//! # Example
//!
//! ```no_run
//! use census_server::{api, config::Config, db};
//! use census_ingest::{store::PgUserStore, IngestPipeline};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let pipeline = IngestPipeline::new(Arc::new(PgUserStore::new(pool.clone())));
//!     let app = api::create_router(api::AppState {
//!         db: pool,
//!         pipeline: Arc::new(pipeline),
//!         ingest: Arc::new(config.ingest.clone()),
//!     });
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod server;

pub use error::AppError;
