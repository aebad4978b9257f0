//! Build artifact caching for nx
//!
//! Derives monthly-rotating cache keys per target and bucket, and restores
//! or saves the nx cache directory through a `CacheStore`.
//!
//! # Key Hierarchy
//!
//! | Key | Scope | Example |
//! |-----|-------|---------|
//! | Primary | exact target and bucket | `linux-x86_64-2026-10-test-2` |
//! | Fallback 1 | same target, any bucket | `linux-x86_64-2026-10-test` |
//! | Fallback 2 | any target this month | `linux-x86_64-2026-10` |
//!
//! Saving a key that another run already reserved is expected when jobs
//! race, and is only logged.

pub mod keys;
pub mod local;
pub mod store;

pub use keys::{derive_keys, escape_part, host_platform, key_matches, CacheKeyChain, KEY_SEPARATOR};
pub use local::LocalCacheStore;
pub use store::{restore_cache, save_cache, CacheStore};

/// Default directory nx writes its computation cache to
pub const NX_CACHE_PATH: &str = "node_modules/.cache/nx";
