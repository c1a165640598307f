//! Bounded record accumulator

use crate::record::StorageRecord;

/// Records waiting to be persisted together.
///
/// The pipeline owns exactly one of these; it is cleared only after the
/// store has accepted its contents.
#[derive(Debug)]
pub struct Batch {
    records: Vec<StorageRecord>,
    capacity: usize,
}

impl Batch {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record; returns `true` once the batch is full.
    pub fn push(&mut self, record: StorageRecord) -> bool {
        self.records.push(record);
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn records(&self) -> &[StorageRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
