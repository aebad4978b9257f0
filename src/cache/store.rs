//! Cache store abstraction
//!
//! Provides a trait for artifact caches that can be implemented by
//! different backends, plus the restore/save policy shared by all of them.

use crate::cache::keys::CacheKeyChain;
use crate::error::{ErrorKind, MatrixResult};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Abstract artifact cache interface
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Restore `paths` from the first matching key
    ///
    /// The primary key must match exactly; fallback keys match any stored key
    /// they are a part-wise prefix of. Returns the matched key, or `None` on
    /// a miss.
    async fn restore(
        &self,
        paths: &[PathBuf],
        primary_key: &str,
        fallback_keys: &[String],
    ) -> MatrixResult<Option<String>>;

    /// Save `paths` under `key`
    ///
    /// Fails with `MatrixError::CacheReserved` when the key is already taken.
    async fn save(&self, paths: &[PathBuf], key: &str) -> MatrixResult<()>;

    /// Get the human-readable store name for display
    fn store_name(&self) -> &'static str;
}

/// Restore the cache for a key chain, logging the outcome
pub async fn restore_cache(
    store: &dyn CacheStore,
    paths: &[PathBuf],
    chain: &CacheKeyChain,
) -> MatrixResult<Option<String>> {
    debug!(
        "Restoring cache from {} ({})",
        chain.iter().collect::<Vec<_>>().join(", "),
        store.store_name()
    );

    let hit = store.restore(paths, &chain.primary, &chain.fallbacks).await?;
    match &hit {
        Some(key) if *key == chain.primary => info!("Cache hit: {}", key),
        Some(key) => info!("Cache hit on fallback: {}", key),
        None => info!("Cache miss: {}", chain.primary),
    }
    Ok(hit)
}

/// Save the cache under `key`
///
/// A key already reserved by a concurrent run is logged and ignored; every
/// other error is returned.
pub async fn save_cache(store: &dyn CacheStore, paths: &[PathBuf], key: &str) -> MatrixResult<()> {
    debug!("Saving cache to {} ({})", key, store.store_name());

    match store.save(paths, key).await {
        Ok(()) => {
            info!("Cache saved successfully");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::CacheReservation => {
            warn!("{}", e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
