//! Storage backends for loaded records
//!
//! The pipeline and the report generator receive a `UserStore` at
//! construction. `PgUserStore` is the production backend; `MemoryUserStore`
//! keeps rows in process for tests and dry runs.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::record::StorageRecord;
use crate::report::BucketShare;

pub mod memory;
pub mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist `records` atomically, in order.
    ///
    /// Either every record is stored or none is. An empty slice is a no-op.
    async fn insert_batch(&self, records: &[StorageRecord]) -> StoreResult<()>;

    /// Percentage of aged records per bucket. Buckets with no records may be
    /// missing from the result and order is not guaranteed.
    async fn age_distribution(&self) -> StoreResult<Vec<BucketShare>>;
}
