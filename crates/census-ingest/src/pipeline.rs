//! Ingestion pipeline
//!
//! Reads rows one at a time, expands and transforms each, and hands full
//! batches to the store before reading further. At most one batch of
//! unpersisted records is held in memory regardless of file size.
//!
//! A persistence failure aborts the run: the failing batch has already been
//! rolled back by the store and no report is produced. When every batch is
//! stored the age distribution report runs once.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::batch::Batch;
use crate::error::{IngestError, IngestResult};
use crate::expand::expand_paths;
use crate::reader::RowReader;
use crate::report::{AgeDistributionReport, ReportGenerator};
use crate::store::UserStore;
use crate::transform::to_storage_record;

/// Records per transaction
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestSummary {
    pub records_processed: usize,
    pub batches: usize,
    pub elapsed: Duration,
    /// `None` when the report query failed
    pub report: Option<AgeDistributionReport>,
}

pub struct IngestPipeline {
    store: Arc<dyn UserStore>,
    report: ReportGenerator,
    batch_size: usize,
}

impl IngestPipeline {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            report: ReportGenerator::new(store.clone()),
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Load the file at `path`, then report
    pub async fn run_file(&self, path: impl AsRef<Path>) -> IngestResult<IngestSummary> {
        let reader = RowReader::open(path).await?;
        self.run_rows(reader).await
    }

    /// Load everything readable from `source`, then report
    pub async fn run<S: AsyncRead + Unpin + Send>(&self, source: S) -> IngestResult<IngestSummary> {
        self.run_rows(RowReader::from_read(source)).await
    }

    async fn run_rows<R>(&self, reader: RowReader<R>) -> IngestResult<IngestSummary>
    where
        R: tokio::io::AsyncBufRead + Unpin + Send,
    {
        let mut summary = self.load(reader).await?;
        summary.report = self.report.generate().await;
        Ok(summary)
    }

    /// Stream rows into the store without reporting
    pub async fn load<R>(&self, mut reader: RowReader<R>) -> IngestResult<IngestSummary>
    where
        R: tokio::io::AsyncBufRead + Unpin + Send,
    {
        let started = Instant::now();
        let mut batch = Batch::new(self.batch_size);
        let mut summary = IngestSummary::default();

        info!(batch_size = self.batch_size, "Starting CSV processing");

        while let Some(row) = reader.next_row().await? {
            let record = to_storage_record(expand_paths(&row));
            if batch.push(record) {
                self.flush(&mut batch, &mut summary).await?;
                info!(total = summary.records_processed, "Inserted batch");
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, &mut summary).await?;
            info!(total = summary.records_processed, "Inserted final batch");
        }

        summary.elapsed = started.elapsed();
        info!(
            records = summary.records_processed,
            batches = summary.batches,
            lines = reader.line_number(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "CSV processing complete"
        );

        Ok(summary)
    }

    async fn flush(&self, batch: &mut Batch, summary: &mut IngestSummary) -> IngestResult<()> {
        self.store
            .insert_batch(batch.records())
            .await
            .map_err(|source| IngestError::Persist {
                batch: summary.batches + 1,
                records: batch.len(),
                source,
            })?;

        summary.records_processed += batch.len();
        summary.batches += 1;
        batch.clear();
        Ok(())
    }
}

/// Run `pipeline` over `path` on a background task.
///
/// The caller is not told how the run ends; success and failure both go to
/// the log under an `ingest` span carrying `job_id`.
pub fn spawn_ingestion(
    pipeline: Arc<IngestPipeline>,
    path: PathBuf,
    job_id: Uuid,
) -> JoinHandle<Option<IngestSummary>> {
    let span = info_span!("ingest", %job_id, path = %path.display());

    tokio::spawn(
        async move {
            match pipeline.run_file(&path).await {
                Ok(summary) => {
                    info!(records = summary.records_processed, "Ingestion finished");
                    Some(summary)
                }
                Err(e) => {
                    error!(error = %e, "An error occurred during background CSV processing");
                    None
                }
            }
        }
        .instrument(span),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::MemoryUserStore;

    fn csv_with_rows(n: usize) -> String {
        let mut csv = String::from("name.firstName,name.lastName,age\n");
        for i in 0..n {
            csv.push_str(&format!("First{i},Last{i},{}\n", i % 90));
        }
        csv
    }

    #[tokio::test]
    async fn test_exact_batch_is_one_insert() {
        let store = Arc::new(MemoryUserStore::new());
        let pipeline = IngestPipeline::new(store.clone());

        let csv = csv_with_rows(1000);
        let summary = pipeline.run(csv.as_bytes()).await.unwrap();

        assert_eq!(store.insert_calls(), vec![1000]);
        assert_eq!(summary.records_processed, 1000);
        assert_eq!(summary.batches, 1);
    }

    #[tokio::test]
    async fn test_one_over_batch_flushes_remainder() {
        let store = Arc::new(MemoryUserStore::new());
        let pipeline = IngestPipeline::new(store.clone());

        let csv = csv_with_rows(1001);
        let summary = pipeline.run(csv.as_bytes()).await.unwrap();

        assert_eq!(store.insert_calls(), vec![1000, 1]);
        assert_eq!(summary.records_processed, 1001);
    }

    #[tokio::test]
    async fn test_header_only_file_stores_nothing() {
        let store = Arc::new(MemoryUserStore::new());
        let pipeline = IngestPipeline::new(store.clone());

        let summary = pipeline.run("a,b\n".as_bytes()).await.unwrap();

        assert!(store.insert_calls().is_empty());
        assert_eq!(summary.records_processed, 0);
        assert!(summary.report.is_some());
    }

    #[tokio::test]
    async fn test_zero_batch_size_clamped() {
        let pipeline = IngestPipeline::new(Arc::new(MemoryUserStore::new())).with_batch_size(0);
        assert_eq!(pipeline.batch_size(), 1);
    }
}
