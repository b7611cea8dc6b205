//! Cache Module
//!
//! Expiring key/value caches with lazy, read-time expiration.
//!
//! Two stores implement [`Cache`]: [`MemoryCache`] keeps entries for the
//! lifetime of the process, [`StorageCache`] serializes them into a
//! [`StorageBackend`] that may outlive the process and be shared with other
//! consumers.

mod backend;
mod clock;
mod entry;
mod memory;
mod storage;


use std::collections::HashMap;

// Re-export public types
pub use backend::{FileStorage, MemoryStorage, StorageBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use memory::MemoryCache;
pub use storage::StorageCache;

// == Cache Trait ==
/// Key/value cache with optional per-entry TTL.
///
/// Expired entries are only removed when a read observes them; there is no
/// background sweep. `size` counts stored entries, which may include expired
/// ones nobody has read yet.
pub trait Cache<T> {
    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// `ttl_seconds == 0` means the entry never expires.
    fn set_item(&mut self, key: &str, value: T, ttl_seconds: u64);

    /// Returns the live value for `key`, purging it if it has expired.
    fn get_item(&mut self, key: &str) -> Option<T>;

    /// Returns every live entry.
    fn get_all_items(&mut self) -> HashMap<String, T>;

    /// Removes `key` if present.
    fn delete_item(&mut self, key: &str);

    /// Removes every entry.
    fn clear(&mut self);

    /// Number of physically stored entries.
    fn size(&self) -> usize;

    /// True when `key` holds a live value. Purges like [`Cache::get_item`].
    fn has_item(&mut self, key: &str) -> bool {
        self.get_item(key).is_some()
    }

    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}
