//! nx-matrix - Affected project matrix for nx monorepos
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use nx_matrix::cli::args::non_empty;
use nx_matrix::cli::{Cli, Commands, Context, LogFormat};
use nx_matrix::config::ConfigManager;
use nx_matrix::error::{MatrixError, MatrixResult};
use nx_matrix::report::Reporter;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.log_format);

    let reporter = Reporter::new(non_empty(cli.output_file.clone()).map(PathBuf::from));
    if let Some(path) = reporter.output_file() {
        debug!("Writing outputs to {}", path.display());
    }

    match run(cli, reporter.clone()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            reporter.set_failed(&e.to_string());
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries workflow commands and outputs
fn init_logging(debug: bool, format: LogFormat) {
    let filter = if debug {
        EnvFilter::new("nx_matrix=debug")
    } else {
        EnvFilter::new("nx_matrix=info")
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.without_time().init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli, reporter: Reporter) -> MatrixResult<()> {
    let working_directory = match non_empty(cli.working_directory) {
        Some(dir) => {
            info!("Working in custom directory: {}", dir);
            PathBuf::from(dir)
        }
        None => std::env::current_dir()
            .map_err(|e| MatrixError::io("getting current directory", e))?,
    };

    let config_manager = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(&working_directory),
    };
    let config = config_manager.load().await?;

    let ctx = Context {
        config,
        reporter,
        working_directory,
        debug: cli.debug,
    };

    match cli.command {
        Commands::Matrix(args) => nx_matrix::cli::commands::matrix(args, &ctx).await,
        Commands::CacheKeys(args) => nx_matrix::cli::commands::cache_keys(args, &ctx).await,
        Commands::Cache(args) => nx_matrix::cli::commands::cache(args, &ctx).await,
    }
}
