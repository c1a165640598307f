//! Age distribution report
//!
//! The four buckets are fixed and always printed in the same order; a bucket
//! the store returned nothing for prints as `0.00`.

use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use crate::store::UserStore;

const TITLE: &str = "--- Age Distribution Report ---";
const COLUMNS: &str = "Age-Group         % Distribution";
const RULE: &str = "-----------------------------------";
const LABEL_WIDTH: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBucket {
    Under20,
    From20To40,
    From41To60,
    Over60,
}

impl AgeBucket {
    /// Render order
    pub const ALL: [AgeBucket; 4] = [
        AgeBucket::Under20,
        AgeBucket::From20To40,
        AgeBucket::From41To60,
        AgeBucket::Over60,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::Under20 => "< 20",
            AgeBucket::From20To40 => "20 to 40",
            AgeBucket::From41To60 => "40 to 60",
            AgeBucket::Over60 => "> 60",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.label() == label)
    }

    /// `< 20`, `20..=40`, `41..=60`, `> 60`; 40 itself belongs to `20 to 40`.
    pub fn for_age(age: i32) -> Self {
        match age {
            i32::MIN..=19 => AgeBucket::Under20,
            20..=40 => AgeBucket::From20To40,
            41..=60 => AgeBucket::From41To60,
            _ => AgeBucket::Over60,
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Share of aged records in one bucket, already rounded to two decimals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketShare {
    pub bucket: AgeBucket,
    pub percentage: f64,
}

/// Compute bucket shares from raw ages, skipping records without one.
///
/// Mirrors the SQL the PostgreSQL store runs; used by stores that hold rows
/// in memory.
pub fn shares_from_ages(ages: impl IntoIterator<Item = Option<i32>>) -> Vec<BucketShare> {
    let mut counts = [0usize; 4];
    let mut total = 0usize;
    for age in ages.into_iter().flatten() {
        let slot = AgeBucket::ALL
            .iter()
            .position(|b| *b == AgeBucket::for_age(age))
            .unwrap_or(AgeBucket::ALL.len() - 1);
        counts[slot] += 1;
        total += 1;
    }

    AgeBucket::ALL
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(bucket, count)| BucketShare {
            bucket,
            percentage: round2(count as f64 * 100.0 / total as f64),
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One line per bucket in fixed order
#[derive(Debug, Clone, PartialEq)]
pub struct AgeDistributionReport {
    rows: [(AgeBucket, Option<f64>); 4],
}

impl AgeDistributionReport {
    /// Place `shares` into the fixed bucket list, ignoring query order and gaps
    pub fn from_shares(shares: &[BucketShare]) -> Self {
        let rows = AgeBucket::ALL.map(|bucket| {
            let percentage = shares
                .iter()
                .rev()
                .find(|share| share.bucket == bucket)
                .map(|share| share.percentage);
            (bucket, percentage)
        });
        Self { rows }
    }

    /// `None` when no records fell into `bucket`
    pub fn percentage(&self, bucket: AgeBucket) -> Option<f64> {
        self.rows
            .iter()
            .find(|(b, _)| *b == bucket)
            .and_then(|(_, p)| *p)
    }

    pub fn rows(&self) -> impl Iterator<Item = (AgeBucket, Option<f64>)> + '_ {
        self.rows.iter().copied()
    }
}

impl fmt::Display for AgeDistributionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{TITLE}")?;
        writeln!(f, "{COLUMNS}")?;
        writeln!(f, "{RULE}")?;
        for (bucket, percentage) in self.rows() {
            match percentage {
                Some(p) => writeln!(f, "{:<LABEL_WIDTH$}{:.2}", bucket.label(), p)?,
                None => writeln!(f, "{:<LABEL_WIDTH$}0.00", bucket.label())?,
            }
        }
        write!(f, "{RULE}")
    }
}

/// Runs the distribution query once ingestion is done
#[derive(Clone)]
pub struct ReportGenerator {
    store: Arc<dyn UserStore>,
}

impl ReportGenerator {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Query, render and log the report.
    ///
    /// Failures are logged and swallowed; `None` means nothing was printed.
    pub async fn generate(&self) -> Option<AgeDistributionReport> {
        match self.store.age_distribution().await {
            Ok(shares) => {
                let report = AgeDistributionReport::from_shares(&shares);
                for line in report.to_string().lines() {
                    info!(target: "census::report", "{}", line);
                }
                Some(report)
            }
            Err(e) => {
                error!(error = %e, "Error generating age distribution report");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(bucket: AgeBucket, percentage: f64) -> BucketShare {
        BucketShare { bucket, percentage }
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(AgeBucket::for_age(19), AgeBucket::Under20);
        assert_eq!(AgeBucket::for_age(-1), AgeBucket::Under20);
        assert_eq!(AgeBucket::for_age(20), AgeBucket::From20To40);
        assert_eq!(AgeBucket::for_age(40), AgeBucket::From20To40);
        assert_eq!(AgeBucket::for_age(41), AgeBucket::From41To60);
        assert_eq!(AgeBucket::for_age(60), AgeBucket::From41To60);
        assert_eq!(AgeBucket::for_age(61), AgeBucket::Over60);
    }

    #[test]
    fn test_labels_round_trip() {
        for bucket in AgeBucket::ALL {
            assert_eq!(AgeBucket::from_label(bucket.label()), Some(bucket));
        }
        assert_eq!(AgeBucket::from_label("60+"), None);
    }

    #[test]
    fn test_render_fills_missing_buckets() {
        let report = AgeDistributionReport::from_shares(&[share(AgeBucket::Under20, 100.0)]);
        let expected = "\
--- Age Distribution Report ---
Age-Group         % Distribution
-----------------------------------
< 20              100.00
20 to 40          0.00
40 to 60          0.00
> 60              0.00
-----------------------------------";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn test_render_ignores_query_order() {
        let report = AgeDistributionReport::from_shares(&[
            share(AgeBucket::Over60, 33.33),
            share(AgeBucket::Under20, 33.33),
            share(AgeBucket::From41To60, 33.33),
        ]);
        let labels: Vec<_> = report.rows().map(|(b, _)| b.label()).collect();
        assert_eq!(labels, vec!["< 20", "20 to 40", "40 to 60", "> 60"]);
        assert_eq!(report.percentage(AgeBucket::From20To40), None);
        assert_eq!(report.percentage(AgeBucket::Over60), Some(33.33));
    }

    #[test]
    fn test_shares_from_ages() {
        let shares = shares_from_ages([Some(15), Some(45), None, Some(70)]);
        assert_eq!(
            shares,
            vec![
                share(AgeBucket::Under20, 33.33),
                share(AgeBucket::From41To60, 33.33),
                share(AgeBucket::Over60, 33.33),
            ]
        );
        assert!(shares_from_ages([None, None]).is_empty());
    }
}
