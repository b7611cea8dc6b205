//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A stored value together with its expiry.
///
/// Serialized as `{"value": ..., "expiresAt": ...}` by the durable store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry stamped against `now_ms`.
    ///
    /// A TTL of `0` means the entry never expires.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_seconds` - TTL in whole seconds
    /// * `now_ms` - Current Unix time in milliseconds
    pub fn new(value: T, ttl_seconds: u64, now_ms: u64) -> Self {
        let expires_at = if ttl_seconds == 0 {
            None
        } else {
            Some(now_ms.saturating_add(ttl_seconds.saturating_mul(1000)))
        };

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry stays live up to and including its expiry instant; it is
    /// expired only once `expires_at < now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => expires < now_ms,
            None => false,
        }
    }
}
