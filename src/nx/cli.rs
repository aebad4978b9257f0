//! nx CLI wrapper
//!
//! Runs `nx print-affected` for one target at a time and turns its output
//! into a project list.

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::AffectedSource;
use crate::nx::command::{capture_stdout, CommandSpec};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Location of the nx binary inside a workspace
pub const DEFAULT_NX_BIN: &str = "node_modules/.bin/nx";

/// Field selected from `print-affected` output
pub const DEFAULT_AFFECTED_SELECT: &str = "tasks.target.project";

/// Git range that defines "affected"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitBoundaries {
    pub base: Option<String>,
    pub head: Option<String>,
}

/// Handle on the nx CLI of one workspace
#[derive(Debug, Clone)]
pub struct NxCli {
    working_dir: PathBuf,
    bin: PathBuf,
    select: String,
    boundaries: GitBoundaries,
    extra_args: Vec<String>,
    verbose: bool,
}

impl NxCli {
    /// nx at `bin` (relative paths resolve against `working_dir`)
    pub fn new(working_dir: PathBuf, bin: PathBuf) -> Self {
        Self {
            working_dir,
            bin,
            select: DEFAULT_AFFECTED_SELECT.to_string(),
            boundaries: GitBoundaries::default(),
            extra_args: Vec::new(),
            verbose: false,
        }
    }

    /// Set the `--select` field
    pub fn with_select(mut self, select: impl Into<String>) -> Self {
        self.select = select.into();
        self
    }

    /// Set the git range passed as `--base` / `--head`
    pub fn with_boundaries(mut self, boundaries: GitBoundaries) -> Self {
        self.boundaries = boundaries;
        self
    }

    /// Arguments appended verbatim to every invocation
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Ask nx for verbose logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Path of the nx executable
    pub fn bin_path(&self) -> PathBuf {
        if self.bin.is_absolute() {
            self.bin.clone()
        } else {
            self.working_dir.join(&self.bin)
        }
    }

    /// Fail early when nx is not installed in the workspace
    pub fn ensure_installed(&self) -> MatrixResult<()> {
        let bin = self.bin_path();
        debug!("Checking existence of nx at {}", bin.display());

        if bin.is_file() {
            Ok(())
        } else {
            Err(MatrixError::NxNotFound(bin))
        }
    }

    /// `print-affected` invocation for `target`
    pub fn print_affected_command(&self, target: &str) -> CommandSpec {
        let mut args = vec![
            "print-affected".to_string(),
            format!("--target={}", target),
            format!("--select={}", self.select),
        ];
        if let Some(base) = &self.boundaries.base {
            args.push(format!("--base={}", base));
        }
        if let Some(head) = &self.boundaries.head {
            args.push(format!("--head={}", head));
        }
        args.extend(self.extra_args.iter().cloned());

        let mut spec = CommandSpec::new(self.bin_path(), args);
        spec.current_dir = Some(self.working_dir.clone());
        if self.verbose {
            spec.env
                .insert("NX_VERBOSE_LOGGING".to_string(), "true".to_string());
        }
        spec
    }
}

#[async_trait]
impl AffectedSource for NxCli {
    async fn fetch_affected(&self, target: &str) -> MatrixResult<Vec<String>> {
        let spec = self.print_affected_command(target);
        let stdout = capture_stdout(&spec).await?;
        let projects = parse_project_list(&stdout).map_err(|reason| MatrixError::MalformedOutput {
            command: spec.to_string(),
            reason,
        })?;

        debug!("Affected projects for {}: {}", target, projects.join(", "));
        Ok(projects)
    }
}

/// Parse the single `p1, p2, p3` line printed by `print-affected --select`
///
/// Blank output means no affected projects.
pub fn parse_project_list(stdout: &str) -> Result<Vec<String>, String> {
    let line = stdout.trim();
    if line.contains('\n') {
        return Err(format!(
            "expected a single line of projects, got {} lines",
            line.lines().count()
        ));
    }

    Ok(line
        .split(", ")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect())
}
