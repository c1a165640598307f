//! In-process backend
//!
//! Behaves like the PostgreSQL store from the pipeline's point of view:
//! batches are all-or-nothing and the distribution is computed with the same
//! bucket rules. An optional insert failure can be armed to exercise the
//! rollback path.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::UserStore;
use crate::error::{StoreError, StoreResult};
use crate::record::StorageRecord;
use crate::report::{shares_from_ages, BucketShare};

#[derive(Default)]
pub struct MemoryUserStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    rows: Vec<StorageRecord>,
    insert_calls: Vec<usize>,
    inserts_attempted: usize,
    fail_on_insert: Option<usize>,
    fail_reports: bool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `n`th insert (1-based, counted across all batches)
    pub fn failing_on_insert(n: usize) -> Self {
        let store = Self::default();
        store.lock().fail_on_insert = Some(n);
        store
    }

    /// Make every distribution query fail
    pub fn failing_reports() -> Self {
        let store = Self::default();
        store.lock().fail_reports = true;
        store
    }

    /// Committed rows in insertion order
    pub fn records(&self) -> Vec<StorageRecord> {
        self.lock().rows.clone()
    }

    /// Size of every `insert_batch` call, including rejected ones
    pub fn insert_calls(&self) -> Vec<usize> {
        self.lock().insert_calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_batch(&self, records: &[StorageRecord]) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut state = self.lock();
        state.insert_calls.push(records.len());

        let mut staged = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            state.inserts_attempted += 1;
            if state.fail_on_insert == Some(state.inserts_attempted) {
                return Err(StoreError::Rejected {
                    index,
                    message: format!("insert #{} rejected", state.inserts_attempted),
                });
            }
            staged.push(record.clone());
        }

        state.rows.extend(staged);
        Ok(())
    }

    async fn age_distribution(&self) -> StoreResult<Vec<BucketShare>> {
        let state = self.lock();
        if state.fail_reports {
            return Err(StoreError::Report("distribution query disabled".to_string()));
        }
        Ok(shares_from_ages(state.rows.iter().map(|r| r.age)))
    }
}
