//! Affected-project distribution
//!
//! Splits the projects nx reports as affected for each target into a bounded
//! number of CI jobs.
//!
//! # Example
//!
//! With `--distribution '{"test": 2, "build": 1}'` and four affected
//! projects per target, the resulting matrix is:
//!
//! | target | distribution | projects |
//! |--------|--------------|----------|
//! | test   | 1            | p1,p2    |
//! | test   | 2            | p3,p4    |
//! | build  | 1            | p1,p2,p3,p4 |

pub mod builder;
pub mod chunk;
pub mod distribution;

pub use builder::{build_matrix, AffectedSource, Matrix, MatrixRow};
pub use chunk::chunk;
pub use distribution::{DistributionSpec, DEFAULT_DISTRIBUTION};
