//! CLI argument definitions using clap derive
//!
//! Every run input can also come from the environment variables a CI
//! action runner sets (`INPUT_*`).

use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// nx-matrix - Affected project matrix for nx monorepos
///
/// Distributes the projects nx reports as affected across parallel CI jobs
/// and derives build cache keys for each job.
#[derive(Parser, Debug)]
#[command(name = "nx-matrix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (also makes nx verbose)
    #[arg(long, global = true, env = "INPUT_DEBUG", value_parser = FalseyValueParser::new())]
    pub debug: bool,

    /// Log output format
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// Configuration file path (defaults to .nx-matrix.toml in the workspace)
    #[arg(short, long, global = true, env = "NX_MATRIX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Workspace root to run nx in (defaults to current directory)
    #[arg(short, long, global = true, env = "INPUT_WORKINGDIRECTORY")]
    pub working_directory: Option<String>,

    /// File step outputs are appended to (stdout when unset)
    #[arg(long, global = true, env = "GITHUB_OUTPUT")]
    pub output_file: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the affected job matrix
    Matrix(MatrixArgs),

    /// Print cache keys for one job
    CacheKeys(CacheKeysArgs),

    /// Restore or save the nx cache for one job
    Cache(CacheArgs),
}

/// Arguments for the matrix command
#[derive(Args, Debug)]
pub struct MatrixArgs {
    /// Comma-separated targets (e.g. test,build)
    #[arg(short, long, env = "INPUT_TARGETS", default_value = "")]
    pub targets: String,

    /// Jobs per target: a number, or a JSON object like {"test": 2, "build": 1}
    #[arg(short, long, env = "INPUT_MAXDISTRIBUTION")]
    pub distribution: Option<String>,

    /// Base of the affected range
    #[arg(long, env = "NX_BASE")]
    pub base: Option<String>,

    /// Head of the affected range
    #[arg(long, env = "NX_HEAD")]
    pub head: Option<String>,

    /// Whitespace-separated arguments forwarded to nx
    #[arg(long, env = "INPUT_ARGS", allow_hyphen_values = true)]
    pub args: Option<String>,

    /// Further arguments forwarded to nx
    #[arg(last = true)]
    pub nx_args: Vec<String>,
}

impl MatrixArgs {
    /// All arguments to forward to nx, in order
    pub fn forwarded_args(&self) -> Vec<String> {
        self.args
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .chain(self.nx_args.iter().cloned())
            .collect()
    }
}

/// Identifies one job of the matrix
#[derive(Args, Debug)]
pub struct JobArgs {
    /// Target name
    #[arg(long, env = "INPUT_TARGET")]
    pub target: String,

    /// 1-based bucket index within the target
    #[arg(long, env = "INPUT_DISTRIBUTION")]
    pub distribution: usize,

    /// Override the platform component of the key
    #[arg(long)]
    pub platform: Option<String>,

    /// Override the architecture component of the key
    #[arg(long)]
    pub arch: Option<String>,
}

/// Arguments for the cache-keys command
#[derive(Args, Debug)]
pub struct CacheKeysArgs {
    #[command(flatten)]
    pub job: JobArgs,
}

/// Arguments for the cache command
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Restore the closest matching cache into the workspace
    Restore(CacheOpArgs),

    /// Save workspace paths under the job's primary key
    Save(CacheOpArgs),
}

/// Arguments shared by cache restore and save
#[derive(Args, Debug)]
pub struct CacheOpArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Path to cache, relative to the workspace (repeatable)
    #[arg(long = "path")]
    pub paths: Vec<PathBuf>,

    /// Local cache store directory
    #[arg(long, env = "NX_MATRIX_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// Treat empty strings (unset CI inputs) as absent
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_matrix_args() {
        let cli = Cli::try_parse_from([
            "nx-matrix",
            "matrix",
            "--targets",
            "test,build",
            "--distribution",
            "2",
            "--args",
            "--parallel=false --verbose",
            "--",
            "--exclude=docs",
        ])
        .unwrap();

        let Commands::Matrix(args) = cli.command else {
            panic!("expected matrix command");
        };
        assert_eq!(args.targets, "test,build");
        assert_eq!(args.distribution.as_deref(), Some("2"));
        assert_eq!(
            args.forwarded_args(),
            vec!["--parallel=false", "--verbose", "--exclude=docs"]
        );
    }

    #[test]
    fn parse_cache_save() {
        let cli = Cli::try_parse_from([
            "nx-matrix",
            "--debug",
            "cache",
            "save",
            "--target",
            "test",
            "--distribution",
            "2",
            "--path",
            "dist",
        ])
        .unwrap();

        assert!(cli.debug);
        let Commands::Cache(CacheArgs {
            action: CacheAction::Save(op),
        }) = cli.command
        else {
            panic!("expected cache save");
        };
        assert_eq!(op.job.target, "test");
        assert_eq!(op.job.distribution, 2);
        assert_eq!(op.paths, vec![PathBuf::from("dist")]);
    }

    #[test]
    fn non_empty_filters_blank() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("apps".to_string())), Some("apps".to_string()));
    }
}
