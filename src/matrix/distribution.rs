//! Bucket count resolution per target

use crate::error::{MatrixError, MatrixResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Bucket count used when no distribution input is given
pub const DEFAULT_DISTRIBUTION: i64 = 3;

/// How many buckets each target is split into
///
/// Deserializes from either a bare integer (`2`) or a JSON object mapping
/// target names to integers (`{"test": 2, "build": 1}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DistributionSpec {
    /// Same bucket count for every target
    Uniform(i64),
    /// Explicit bucket count per target
    PerTarget(HashMap<String, i64>),
}

impl DistributionSpec {
    /// Parse the raw run input
    ///
    /// An empty (or whitespace-only) input falls back to `default`.
    pub fn parse(input: &str, default: i64) -> MatrixResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::Uniform(default));
        }

        serde_json::from_str(trimmed).map_err(|_| MatrixError::DistributionParse {
            input: input.to_string(),
            reason: "expected an integer or a JSON object mapping targets to integers"
                .to_string(),
        })
    }

    /// Bucket count for `target`
    pub fn resolve(&self, target: &str) -> MatrixResult<usize> {
        let value = match self {
            Self::Uniform(n) => *n,
            Self::PerTarget(map) => *map.get(target).ok_or_else(|| {
                MatrixError::MissingDistribution {
                    target: target.to_string(),
                }
            })?,
        };

        if value < 1 {
            return Err(MatrixError::InvalidDistribution {
                target: target.to_string(),
                value,
            });
        }

        usize::try_from(value).map_err(|_| MatrixError::InvalidDistribution {
            target: target.to_string(),
            value,
        })
    }

    /// Resolve every target up front, failing on the first bad one
    pub fn resolve_all(&self, targets: &[String]) -> MatrixResult<Vec<usize>> {
        targets.iter().map(|t| self.resolve(t)).collect()
    }
}

impl Default for DistributionSpec {
    fn default() -> Self {
        Self::Uniform(DEFAULT_DISTRIBUTION)
    }
}

impl fmt::Display for DistributionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform(n) => write!(f, "{}", n),
            Self::PerTarget(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort();
                let rendered: Vec<String> =
                    entries.iter().map(|(t, n)| format!("{}={}", t, n)).collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
        }
    }
}
