//! Run inputs
//!
//! Raw strings from flags or CI environment variables are parsed once into
//! a `RunInputs` value that the rest of the crate takes by reference.

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::DistributionSpec;
use crate::nx::GitBoundaries;
use std::path::PathBuf;

/// Everything a matrix run needs
#[derive(Debug, Clone)]
pub struct RunInputs {
    /// Targets in request order
    pub targets: Vec<String>,
    /// Bucket count per target
    pub distribution: DistributionSpec,
    /// Workspace root nx runs in
    pub working_directory: PathBuf,
    /// Verbose logging for nx-matrix and nx
    pub debug: bool,
    /// Arguments forwarded verbatim to nx
    pub args: Vec<String>,
    /// Git range defining "affected"
    pub boundaries: GitBoundaries,
}

impl RunInputs {
    /// Parse the target list and distribution inputs
    ///
    /// The remaining fields start out at their defaults.
    pub fn parse(
        targets: &str,
        distribution: &str,
        default_distribution: i64,
    ) -> MatrixResult<Self> {
        let targets = parse_targets(targets);
        if targets.is_empty() {
            return Err(MatrixError::NoTargets);
        }

        Ok(Self {
            targets,
            distribution: DistributionSpec::parse(distribution, default_distribution)?,
            working_directory: PathBuf::from("."),
            debug: false,
            args: Vec::new(),
            boundaries: GitBoundaries::default(),
        })
    }
}

/// Split a comma-separated target list, dropping empty entries
pub fn parse_targets(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
