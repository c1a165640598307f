//! Census Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Streams a comma-separated file of people records into PostgreSQL and
//! reports the age distribution of what was loaded.
//!
//! # Pipeline
//!
//! - **reader**: line-at-a-time CSV reading, header capture, flat rows
//! - **expand**: `name.firstName`-style keys expanded into nested JSON
//! - **transform**: nested rows mapped onto the `users` table shape
//! - **batch**: bounded accumulation between reader and store
//! - **store**: the `UserStore` seam, with PostgreSQL and in-memory backends
//! - **pipeline**: orchestration, progress logging, background spawning
//! - **report**: fixed-bucket age distribution report
//!
//! # Example
//!
//! ```no_run
//! use census_ingest::{store::PgUserStore, IngestPipeline};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = sqlx::PgPool::connect("postgresql://localhost/census").await?;
//!     let pipeline = IngestPipeline::new(Arc::new(PgUserStore::new(pool)));
//!     let summary = pipeline.run_file("./data/people.csv").await?;
//!     println!("{} records", summary.records_processed);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod error;
pub mod expand;
pub mod pipeline;
pub mod reader;
pub mod record;
pub mod report;
pub mod store;
pub mod transform;

pub use error::{IngestError, IngestResult, StoreError, StoreResult};
pub use pipeline::{spawn_ingestion, IngestPipeline, IngestSummary, DEFAULT_BATCH_SIZE};
pub use record::{FlatRow, NestedRecord, StorageRecord};
pub use report::{AgeBucket, AgeDistributionReport, BucketShare, ReportGenerator};
pub use store::UserStore;
