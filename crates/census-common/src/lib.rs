//! Census Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the census workspace members:
//!
//! - **Logging**: `tracing` subscriber setup driven by `LOG_*` environment variables
//! - **Error Handling**: the error type shared by configuration and logging setup
//!
//! # Example
//!
//! ```no_run
//! use census_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> census_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     let _guard = init_logging(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

pub use error::{CommonError, Result};
