//! Matrix assembly from affected projects

use crate::error::MatrixResult;
use crate::matrix::chunk::chunk;
use crate::matrix::distribution::DistributionSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Source of affected projects for a target
///
/// Implemented by the nx CLI wrapper in production and by fakes in tests.
#[async_trait]
pub trait AffectedSource: Send + Sync {
    /// Ordered, duplicate-free list of projects affected for `target`
    async fn fetch_affected(&self, target: &str) -> MatrixResult<Vec<String>>;
}

/// One CI job: a target plus the slice of projects it should handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
    /// Target name
    pub target: String,
    /// 1-based bucket index within the target
    pub distribution: usize,
    /// Comma-joined project names
    pub projects: String,
}

/// CI job matrix, serialized as `{"include": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    pub include: Vec<MatrixRow>,
}

impl Matrix {
    /// Whether any row has at least one project
    pub fn has_changes(&self) -> bool {
        self.include.iter().any(|row| !row.projects.is_empty())
    }

    /// Rows belonging to `target`, in bucket order
    pub fn rows_for<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a MatrixRow> + 'a {
        self.include.iter().filter(move |row| row.target == target)
    }
}

/// Build the matrix for `targets`
///
/// Every target's bucket count is resolved before the first fetch, so a
/// misconfigured distribution never costs an nx invocation. Targets are
/// fetched one at a time in request order; the first fetch error aborts the
/// whole build. Targets with no affected projects contribute no rows.
pub async fn build_matrix(
    targets: &[String],
    spec: &DistributionSpec,
    source: &dyn AffectedSource,
) -> MatrixResult<Matrix> {
    let bucket_counts = spec.resolve_all(targets)?;
    let mut matrix = Matrix::default();

    for (target, buckets) in targets.iter().zip(bucket_counts) {
        debug!("Calculating affected for {:?} target ({} buckets)", target, buckets);
        let projects = source.fetch_affected(target).await?;

        if projects.is_empty() {
            info!("No affected projects for {}", target);
            continue;
        }

        let rows = chunk(&projects, buckets)
            .into_iter()
            .enumerate()
            .map(|(idx, bucket)| MatrixRow {
                target: target.clone(),
                distribution: idx + 1,
                projects: bucket.join(","),
            });
        matrix.include.extend(rows);
    }

    debug!("Matrix has {} rows", matrix.include.len());
    Ok(matrix)
}
