//! Cache key derivation
//!
//! Keys are built from `[platform-arch, year, month, target, bucket]` joined
//! with `-`. The month component rotates the primary key every calendar
//! month, which bounds how stale a restored cache can be.

use crate::error::{MatrixError, MatrixResult};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Separator between key parts
pub const KEY_SEPARATOR: char = '-';

/// Primary cache key plus progressively less specific fallbacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKeyChain {
    /// Exact key for this target and bucket
    pub primary: String,
    /// Same target any bucket, then same platform and month any target
    pub fallbacks: Vec<String>,
}

impl CacheKeyChain {
    /// Primary key followed by the fallbacks
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }
}

/// Operating system and architecture of the running binary
pub fn host_platform() -> (&'static str, &'static str) {
    (std::env::consts::OS, std::env::consts::ARCH)
}

/// Escape a dynamic key part so it cannot be mistaken for a part boundary
///
/// `%` and the separator are percent-encoded. Empty parts and parts with
/// whitespace or commas are rejected: CI cache actions take restore keys as a
/// comma or newline separated list.
pub fn escape_part(part: &str) -> MatrixResult<String> {
    if part.is_empty() {
        return Err(MatrixError::InvalidKeyPart {
            part: part.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if part.chars().any(|c| c.is_whitespace() || c == ',') {
        return Err(MatrixError::InvalidKeyPart {
            part: part.to_string(),
            reason: "must not contain whitespace or commas".to_string(),
        });
    }

    let mut escaped = String::with_capacity(part.len());
    for c in part.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            KEY_SEPARATOR => escaped.push_str("%2D"),
            _ => escaped.push(c),
        }
    }
    Ok(escaped)
}

/// Derive the key chain for one bucket of a target
pub fn derive_keys(
    target: &str,
    bucket: usize,
    platform: &str,
    arch: &str,
    now: DateTime<Utc>,
) -> MatrixResult<CacheKeyChain> {
    if bucket == 0 {
        return Err(MatrixError::InvalidKeyPart {
            part: bucket.to_string(),
            reason: "bucket index starts at 1".to_string(),
        });
    }

    let parts = [
        format!("{}{}{}", escape_part(platform)?, KEY_SEPARATOR, escape_part(arch)?),
        now.year().to_string(),
        now.month().to_string(),
        escape_part(target)?,
        bucket.to_string(),
    ];

    let separator = KEY_SEPARATOR.to_string();
    let join = |parts: &[String]| parts.join(separator.as_str());
    let chain = CacheKeyChain {
        primary: join(&parts[..]),
        fallbacks: vec![join(&parts[..parts.len() - 1]), join(&parts[..parts.len() - 2])],
    };

    tracing::debug!("Derived cache key {}", chain.primary);
    Ok(chain)
}

/// Whether a stored `key` is covered by `restore_key`
///
/// Matches on whole parts only: `...-test` covers `...-test-2` but not
/// `...-tests-1`.
pub fn key_matches(key: &str, restore_key: &str) -> bool {
    match key.strip_prefix(restore_key) {
        Some(rest) => rest.is_empty() || rest.starts_with(KEY_SEPARATOR),
        None => false,
    }
}
