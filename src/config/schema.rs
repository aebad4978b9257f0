//! Configuration schema for nx-matrix
//!
//! Configuration is read from `.nx-matrix.toml` in the workspace root.
//! Every field is optional; command-line flags take precedence.

use crate::cache::NX_CACHE_PATH;
use crate::matrix::DEFAULT_DISTRIBUTION;
use crate::nx::{DEFAULT_AFFECTED_SELECT, DEFAULT_NX_BIN};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// nx invocation settings
    pub nx: NxConfig,

    /// Matrix defaults
    pub matrix: MatrixConfig,

    /// Cache settings
    pub cache: CacheConfig,
}

/// nx invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NxConfig {
    /// Path to the nx binary, relative to the workspace root
    pub bin: PathBuf,

    /// Field selected from `print-affected`
    pub select: String,
}

impl Default for NxConfig {
    fn default() -> Self {
        Self {
            bin: PathBuf::from(DEFAULT_NX_BIN),
            select: DEFAULT_AFFECTED_SELECT.to_string(),
        }
    }
}

/// Matrix defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Buckets per target when no distribution is given
    pub default_distribution: i64,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            default_distribution: DEFAULT_DISTRIBUTION,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Local store directory (defaults to the user cache directory)
    pub dir: Option<PathBuf>,

    /// Paths to cache, relative to the workspace root
    pub paths: Vec<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            paths: vec![PathBuf::from(NX_CACHE_PATH)],
        }
    }
}
