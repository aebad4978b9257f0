//! Command-line interface

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, LogFormat};

use crate::config::Config;
use crate::report::Reporter;
use std::path::PathBuf;

/// Per-run state shared by all commands
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration
    pub config: Config,
    /// Output sink for CI step outputs
    pub reporter: Reporter,
    /// Workspace root
    pub working_directory: PathBuf,
    /// Debug logging requested
    pub debug: bool,
}
