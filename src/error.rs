//! Error types for nx-matrix
//!
//! All modules use `MatrixResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for nx-matrix operations
pub type MatrixResult<T> = Result<T, MatrixError>;

/// Broad classification used by callers to decide how an error is surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or missing run configuration, detected before any nx call
    Config,
    /// The nx CLI (or another subprocess) failed
    ExternalTool,
    /// A cache key was already reserved by a concurrent run
    CacheReservation,
    /// Anything else
    Other,
}

/// All errors that can occur in nx-matrix
#[derive(Error, Debug)]
pub enum MatrixError {
    // Configuration errors
    #[error("Missing distribution for target: {target}")]
    MissingDistribution { target: String },

    #[error("Invalid distribution for target {target}: {value} (must be at least 1)")]
    InvalidDistribution { target: String, value: i64 },

    #[error("Invalid distribution input {input:?}: {reason}")]
    DistributionParse { input: String, reason: String },

    #[error("No targets given")]
    NoTargets,

    #[error("Invalid cache key part {part:?}: {reason}")]
    InvalidKeyPart { part: String, reason: String },

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // nx errors
    #[error("Couldn't find Nx binary at {0}")]
    NxNotFound(PathBuf),

    #[error("Command failed: {command}, exit code: {code:?}, stderr: {stderr}")]
    NxCommand {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed output from {command}: {reason}")]
    MalformedOutput { command: String, reason: String },

    // Cache errors
    #[error("Cache key already reserved: {0}")]
    CacheReserved(String),

    #[error("Unreadable cache entry {path}: {reason}")]
    CacheEntry { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MatrixError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a non-zero exit error
    pub fn command_exec(
        command: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::NxCommand {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingDistribution { .. }
            | Self::InvalidDistribution { .. }
            | Self::DistributionParse { .. }
            | Self::NoTargets
            | Self::InvalidKeyPart { .. }
            | Self::ConfigInvalid { .. } => ErrorKind::Config,
            Self::NxNotFound(_)
            | Self::NxCommand { .. }
            | Self::CommandFailed { .. }
            | Self::MalformedOutput { .. } => ErrorKind::ExternalTool,
            Self::CacheReserved(_) => ErrorKind::CacheReservation,
            _ => ErrorKind::Other,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NxNotFound(_) => Some("Have you run npm/yarn install?"),
            Self::MissingDistribution { .. } => {
                Some("Add the target to the distribution map, or pass a single number")
            }
            Self::NoTargets => Some("Pass --targets or set INPUT_TARGETS"),
            _ => None,
        }
    }
}
