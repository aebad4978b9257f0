//! nx-matrix - Affected project matrix for nx monorepos
//!
//! Splits the projects nx reports as affected into a bounded number of
//! parallel CI jobs per target, and derives monthly-rotating cache keys with
//! fallbacks for each job.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod matrix;
pub mod nx;
pub mod report;

pub use error::{MatrixError, MatrixResult};
