//! Directory-backed cache store
//!
//! Each saved key gets its own entry directory named after a hash of the
//! key. A save is assembled in a private staging directory and renamed into
//! `entries/` only once its manifest is written, so entries are never seen
//! half-written and an interrupted save never holds a key.
//!
//! ```text
//! <root>/staging/<uuid>/               save in progress
//! <root>/entries/<sha256(key)[..16]>/
//!     entry.json          key, creation time, saved paths
//!     data/<path>...      copied files
//! ```

use crate::cache::keys::key_matches;
use crate::cache::store::CacheStore;
use crate::error::{MatrixError, MatrixResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

const MANIFEST_FILE: &str = "entry.json";
const DATA_DIR: &str = "data";

/// Metadata written last when an entry is complete
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryManifest {
    key: String,
    created_at: DateTime<Utc>,
    paths: Vec<PathBuf>,
}

/// Cache store keeping entries in a local directory
#[derive(Debug, Clone)]
pub struct LocalCacheStore {
    root: PathBuf,
    workspace: PathBuf,
}

impl LocalCacheStore {
    /// Create a store rooted at `root`, resolving cache paths against `workspace`
    pub fn new(root: PathBuf, workspace: PathBuf) -> Self {
        Self { root, workspace }
    }

    /// Default store location in the user cache directory
    pub fn default_root() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nx-matrix")
    }

    /// Store root
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entries_dir(&self) -> PathBuf {
        self.root.join("entries")
    }

    fn entry_dir(&self, key: &str) -> PathBuf {
        self.entries_dir().join(entry_id(key))
    }

    fn staging_dir(&self) -> PathBuf {
        self.root.join("staging")
    }

    /// Read the manifests of all complete entries
    async fn complete_entries(&self) -> MatrixResult<Vec<(PathBuf, EntryManifest)>> {
        let dir = self.entries_dir();
        let mut reader = match fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(MatrixError::io(
                    format!("reading cache entries in {}", dir.display()),
                    e,
                ))
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| MatrixError::io(format!("reading {}", dir.display()), e))?
        {
            let path = entry.path();
            match read_manifest(&path).await {
                Ok(Some(manifest)) => entries.push((path, manifest)),
                Ok(None) => debug!("Skipping incomplete cache entry {}", path.display()),
                Err(e) => warn!("Skipping cache entry: {}", e),
            }
        }
        Ok(entries)
    }

    /// Fill `staging` with data and manifest, then move it into place
    async fn stage_and_publish(
        &self,
        staging: &Path,
        entry: &Path,
        paths: &[PathBuf],
        key: &str,
    ) -> MatrixResult<()> {
        let saved = self.copy_into_entry(staging, paths).await?;

        let manifest = EntryManifest {
            key: key.to_string(),
            created_at: Utc::now(),
            paths: saved,
        };
        let manifest_path = staging.join(MANIFEST_FILE);
        fs::write(&manifest_path, serde_json::to_vec_pretty(&manifest)?)
            .await
            .map_err(|e| MatrixError::io(format!("writing {}", manifest_path.display()), e))?;

        let entries = self.entries_dir();
        fs::create_dir_all(&entries)
            .await
            .map_err(|e| MatrixError::io(format!("creating {}", entries.display()), e))?;

        // The rename is the reservation: it fails when a complete entry exists
        if let Err(e) = fs::rename(staging, entry).await {
            if is_complete(entry).await {
                return Err(MatrixError::CacheReserved(key.to_string()));
            }
            if fs::metadata(entry).await.is_err() {
                return Err(MatrixError::io(format!("publishing {}", entry.display()), e));
            }

            // Manifest-less entry left by an interrupted save
            warn!("Reclaiming incomplete cache entry {}", entry.display());
            fs::remove_dir_all(entry)
                .await
                .map_err(|e| MatrixError::io(format!("removing {}", entry.display()), e))?;
            if let Err(e) = fs::rename(staging, entry).await {
                if is_complete(entry).await {
                    return Err(MatrixError::CacheReserved(key.to_string()));
                }
                return Err(MatrixError::io(format!("publishing {}", entry.display()), e));
            }
        }
        Ok(())
    }

    async fn copy_into_entry(&self, entry: &Path, paths: &[PathBuf]) -> MatrixResult<Vec<PathBuf>> {
        let mut saved = Vec::new();
        for path in paths {
            let source = self.workspace.join(path);
            if fs::metadata(&source).await.is_err() {
                warn!("Path does not exist, not caching: {}", source.display());
                continue;
            }

            let dest = entry.join(DATA_DIR).join(path);
            copy_recursive(&source, &dest).await.map_err(|e| {
                MatrixError::io(format!("copying {} into cache", source.display()), e)
            })?;
            saved.push(path.clone());
        }
        Ok(saved)
    }
}

#[async_trait]
impl CacheStore for LocalCacheStore {
    async fn restore(
        &self,
        paths: &[PathBuf],
        primary_key: &str,
        fallback_keys: &[String],
    ) -> MatrixResult<Option<String>> {
        for path in paths {
            validate_cache_path(path)?;
        }

        let entries = self.complete_entries().await?;

        let matched = entries
            .iter()
            .find(|(_, m)| m.key == primary_key)
            .or_else(|| {
                fallback_keys.iter().find_map(|fallback| {
                    entries
                        .iter()
                        .filter(|(_, m)| key_matches(&m.key, fallback))
                        .max_by_key(|(_, m)| m.created_at)
                })
            });

        let Some((entry, manifest)) = matched else {
            return Ok(None);
        };

        for path in paths {
            let source = entry.join(DATA_DIR).join(path);
            if fs::metadata(&source).await.is_err() {
                debug!("Entry {} has no {}", manifest.key, path.display());
                continue;
            }

            let dest = self.workspace.join(path);
            copy_recursive(&source, &dest).await.map_err(|e| {
                MatrixError::io(format!("restoring {} from cache", dest.display()), e)
            })?;
        }

        Ok(Some(manifest.key.clone()))
    }

    async fn save(&self, paths: &[PathBuf], key: &str) -> MatrixResult<()> {
        for path in paths {
            validate_cache_path(path)?;
        }

        let entry = self.entry_dir(key);
        if is_complete(&entry).await {
            return Err(MatrixError::CacheReserved(key.to_string()));
        }

        let staging = self.staging_dir().join(Uuid::new_v4().to_string());
        fs::create_dir_all(&staging)
            .await
            .map_err(|e| MatrixError::io(format!("creating {}", staging.display()), e))?;

        match self.stage_and_publish(&staging, &entry, paths, key).await {
            Ok(()) => {
                debug!("Saved cache entry {} for {}", entry.display(), key);
                Ok(())
            }
            Err(e) => {
                discard(&staging).await;
                Err(e)
            }
        }
    }

    fn store_name(&self) -> &'static str {
        "local"
    }
}

/// Entry directory name: first 16 hex chars of the key's SHA256
fn entry_id(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(&digest[..8])
}

/// Cache paths must stay inside the workspace
fn validate_cache_path(path: &Path) -> MatrixResult<()> {
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if escapes || path.as_os_str().is_empty() {
        return Err(MatrixError::PathInvalid {
            path: path.to_path_buf(),
            reason: "cache paths must be relative to the workspace".to_string(),
        });
    }
    Ok(())
}

async fn is_complete(entry: &Path) -> bool {
    fs::try_exists(entry.join(MANIFEST_FILE))
        .await
        .unwrap_or(false)
}

/// Remove a staging directory, logging instead of failing
async fn discard(dir: &Path) {
    if let Err(e) = fs::remove_dir_all(dir).await {
        warn!("Failed to remove {}: {}", dir.display(), e);
    }
}

async fn read_manifest(entry: &Path) -> MatrixResult<Option<EntryManifest>> {
    let path = entry.join(MANIFEST_FILE);
    let content = match fs::read(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(MatrixError::io(format!("reading {}", path.display()), e)),
    };

    serde_json::from_slice(&content)
        .map(Some)
        .map_err(|e| MatrixError::CacheEntry {
            path,
            reason: e.to_string(),
        })
}

/// Copy a file or directory tree, merging into existing directories
fn copy_recursive<'a>(
    source: &'a Path,
    dest: &'a Path,
) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + 'a>> {
    Box::pin(async move {
        let metadata = fs::metadata(source).await?;
        if metadata.is_dir() {
            fs::create_dir_all(dest).await?;
            let mut reader = fs::read_dir(source).await?;
            while let Some(entry) = reader.next_entry().await? {
                let child_source = entry.path();
                let child_dest = dest.join(entry.file_name());
                copy_recursive(&child_source, &child_dest).await?;
            }
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::copy(source, dest).await?;
        }
        Ok(())
    })
}
