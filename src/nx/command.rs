//! Subprocess invocation
//!
//! A command is described up front as an immutable `CommandSpec` and then
//! handed to `capture_stdout`.

use crate::error::{MatrixError, MatrixResult};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Fully specified external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable to run
    pub program: PathBuf,
    /// Arguments, in order
    pub args: Vec<String>,
    /// Working directory (inherits the current one when unset)
    pub current_dir: Option<PathBuf>,
    /// Extra environment variables
    pub env: HashMap<String, String>,
}

impl CommandSpec {
    /// Command with no working directory override and no extra env
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            current_dir: None,
            env: HashMap::new(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Run a command to completion and return its stdout
///
/// Spawn failures, non-zero exits and non-UTF-8 output are all errors.
pub async fn capture_stdout(spec: &CommandSpec) -> MatrixResult<String> {
    debug!("Executing: {}", spec);

    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .envs(&spec.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = &spec.current_dir {
        command.current_dir(dir);
    }

    let output = command
        .output()
        .await
        .map_err(|e| MatrixError::command_failed(spec.to_string(), e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MatrixError::command_exec(
            spec.to_string(),
            output.status.code(),
            stderr.trim(),
        ));
    }

    String::from_utf8(output.stdout).map_err(|e| MatrixError::MalformedOutput {
        command: spec.to_string(),
        reason: e.to_string(),
    })
}
