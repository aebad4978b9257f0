//! CI reporting
//!
//! Emits step outputs, log groups and the failure annotation using GitHub
//! Actions workflow commands. Outputs go to the `GITHUB_OUTPUT` file when one
//! is configured, and to stdout as `name=value` lines otherwise.

use crate::error::{MatrixError, MatrixResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Writes CI outputs and annotations
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    output_file: Option<PathBuf>,
}

impl Reporter {
    /// Reporter appending outputs to `output_file` (usually `$GITHUB_OUTPUT`)
    pub fn new(output_file: Option<PathBuf>) -> Self {
        Self { output_file }
    }

    /// Output file, if any
    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    /// Emit a step output
    ///
    /// Strings are written as-is, everything else as compact JSON.
    pub async fn set_output<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> MatrixResult<()> {
        let rendered = render_value(value)?;

        match &self.output_file {
            Some(path) => append(path, &heredoc(name, &rendered))
                .await
                .map_err(|e| MatrixError::io(format!("writing output to {}", path.display()), e)),
            None => {
                print!("{}", stdout_record(name, &rendered));
                Ok(())
            }
        }
    }

    /// Start a collapsible log group
    pub fn group(&self, title: &str) {
        println!("::group::{}", title);
    }

    /// Close the current log group
    pub fn end_group(&self) {
        println!("::endgroup::");
    }

    /// Mark the run as failed with `message`
    pub fn set_failed(&self, message: &str) {
        println!("::error::{}", escape_data(message));
    }
}

/// Strings as-is, anything else as compact JSON in field order
fn render_value<T: Serialize + ?Sized>(value: &T) -> MatrixResult<String> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        _ => Ok(serde_json::to_string(value)?),
    }
}

/// `name<<DELIM` block; the random delimiter can never end the value early
fn heredoc(name: &str, value: &str) -> String {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// `name=value`, or a heredoc block when the value spans lines
fn stdout_record(name: &str, value: &str) -> String {
    if value.contains('\n') {
        heredoc(name, value)
    } else {
        format!("{name}={value}\n")
    }
}

/// Escape a workflow command message
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

async fn append(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await
}
