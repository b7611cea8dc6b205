//! Memory Cache Module
//!
//! Volatile cache store backed by a HashMap owned by the process.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::cache::{Cache, CacheEntry, Clock, SystemClock};

// == Memory Cache ==
/// In-process cache store. Entries are lost when the store is dropped.
#[derive(Debug)]
pub struct MemoryCache<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Time source for stamping and checking expiry
    clock: Arc<dyn Clock>,
}

impl<T> MemoryCache<T> {
    // == Constructor ==
    /// Creates an empty store on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
        }
    }
}

impl<T> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Cache<T> for MemoryCache<T> {
    // == Set ==
    fn set_item(&mut self, key: &str, value: T, ttl_seconds: u64) {
        let entry = CacheEntry::new(value, ttl_seconds, self.clock.now_ms());
        self.entries.insert(key.to_string(), entry);
    }

    // == Get ==
    fn get_item(&mut self, key: &str) -> Option<T> {
        let now = self.clock.now_ms();
        let entry = self.entries.get(key)?;

        if entry.is_expired(now) {
            self.entries.remove(key);
            debug!(key, "purged expired entry");
            return None;
        }

        Some(entry.value.clone())
    }

    // == Get All ==
    /// Returns live entries only. Expired entries are skipped but stay stored
    /// until a `get_item` on their key purges them.
    fn get_all_items(&mut self) -> HashMap<String, T> {
        let now = self.clock.now_ms();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    // == Delete ==
    fn delete_item(&mut self, key: &str) {
        self.entries.remove(key);
    }

    // == Clear ==
    fn clear(&mut self) {
        self.entries.clear();
    }

    // == Size ==
    fn size(&self) -> usize {
        self.entries.len()
    }
}
