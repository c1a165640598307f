//! PostgreSQL `users` table backend

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Connection, PgPool};
use tracing::{debug, error, warn};

use super::UserStore;
use crate::error::{StoreError, StoreResult};
use crate::record::StorageRecord;
use crate::report::{AgeBucket, BucketShare};

const INSERT_USER: &str = r#"
    INSERT INTO public.users (name, age, address, additional_info)
    VALUES ($1, $2, $3, $4)
"#;

const AGE_DISTRIBUTION: &str = r#"
    WITH age_groups AS (
        SELECT
            CASE
                WHEN age < 20 THEN '< 20'
                WHEN age BETWEEN 20 AND 40 THEN '20 to 40'
                WHEN age BETWEEN 41 AND 60 THEN '40 to 60'
                WHEN age > 60 THEN '> 60'
            END AS age_group
        FROM public.users
        WHERE age IS NOT NULL
    ),
    group_counts AS (
        SELECT age_group, COUNT(*) AS count
        FROM age_groups
        GROUP BY age_group
    ),
    total_count AS (
        SELECT COUNT(*) AS total FROM public.users WHERE age IS NOT NULL
    )
    SELECT
        gc.age_group,
        ROUND((gc.count::decimal / tc.total) * 100, 2)::float8 AS percentage
    FROM group_counts gc, total_count tc
"#;

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_batch(&self, records: &[StorageRecord]) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        // Held until the end of this call; dropping it returns it to the pool.
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        for (index, record) in records.iter().enumerate() {
            let inserted = sqlx::query(INSERT_USER)
                .bind(&record.name)
                .bind(record.age)
                .bind(Json(&record.address))
                .bind(Json(&record.additional_info))
                .execute(&mut *tx)
                .await;

            if let Err(e) = inserted {
                error!(
                    index,
                    batch_size = records.len(),
                    error = %e,
                    "Error during batch insert. Rolling back transaction."
                );
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "Rollback failed");
                }
                return Err(StoreError::Insert { index, source: e });
            }
        }

        tx.commit().await?;
        debug!(records = records.len(), "Committed batch");

        Ok(())
    }

    async fn age_distribution(&self) -> StoreResult<Vec<BucketShare>> {
        let rows: Vec<(Option<String>, Option<f64>)> = sqlx::query_as(AGE_DISTRIBUTION)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Report(e.to_string()))?;

        let shares = rows
            .into_iter()
            .filter_map(|(label, percentage)| {
                let label = label?;
                match AgeBucket::from_label(&label) {
                    Some(bucket) => Some(BucketShare {
                        bucket,
                        percentage: percentage.unwrap_or(0.0),
                    }),
                    None => {
                        warn!(label = %label, "Ignoring unknown age group");
                        None
                    }
                }
            })
            .collect();

        Ok(shares)
    }
}
