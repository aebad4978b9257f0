//! Configuration management for nx-matrix

pub mod inputs;
pub mod schema;

pub use inputs::{parse_targets, RunInputs};
pub use schema::Config;

use crate::error::{MatrixError, MatrixResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Name of the workspace-local config file
pub const CONFIG_FILE_NAME: &str = ".nx-matrix.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Config manager for the default file in `workspace`
    pub fn new(workspace: &Path) -> Self {
        Self {
            config_path: Self::default_config_path(workspace),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path(workspace: &Path) -> PathBuf {
        workspace.join(CONFIG_FILE_NAME)
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> MatrixResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> MatrixResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| MatrixError::io(format!("reading config from {}", path.display()), e))?;

        debug!("Loaded config from {}", path.display());
        toml::from_str(&content).map_err(|e| MatrixError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}
