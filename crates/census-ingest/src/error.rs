//! Error types for ingestion and storage

use thiserror::Error;

pub type IngestResult<T> = std::result::Result<T, IngestError>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures that abort an ingestion run
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to persist batch {batch} ({records} records): {source}")]
    Persist {
        batch: usize,
        records: usize,
        #[source]
        source: StoreError,
    },
}

/// Failures raised by a `UserStore` backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Insert of record {index} in batch failed: {source}")]
    Insert {
        index: usize,
        #[source]
        source: sqlx::Error,
    },

    #[error("Insert of record {index} in batch rejected: {message}")]
    Rejected { index: usize, message: String },

    #[error("Report query failed: {0}")]
    Report(String),
}
