//! Storage Cache Module
//!
//! Durable cache store. Entries are serialized as JSON
//! (`{"value": ..., "expiresAt": ...}`) into a [`StorageBackend`].

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{Cache, CacheEntry, Clock, StorageBackend, SystemClock};
use crate::error::Result;

// == Storage Cache ==
/// Cache store writing through to a shared durable medium.
///
/// The medium is not owned by this store. `size` and `clear` act on the
/// whole medium, and `get_all_items` scans every key in it, skipping values
/// that are not cache entries of this type.
#[derive(Debug)]
pub struct StorageCache<T, B> {
    storage: B,
    clock: Arc<dyn Clock>,
    _value: PhantomData<fn() -> T>,
}

impl<T, B: StorageBackend> StorageCache<T, B> {
    // == Constructor ==
    /// Creates a store over `storage` on the wall clock.
    pub fn new(storage: B) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    /// Creates a store over `storage` on the given clock.
    pub fn with_clock(storage: B, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            _value: PhantomData,
        }
    }

    /// The underlying medium.
    pub fn storage(&self) -> &B {
        &self.storage
    }
}

impl<T, B> StorageCache<T, B>
where
    T: Serialize + DeserializeOwned,
    B: StorageBackend,
{
    // == Try Get ==
    /// Like [`Cache::get_item`] but surfaces entries that fail to parse.
    ///
    /// Expired entries are removed from the medium and reported as absent.
    /// A parse failure leaves the raw value in place.
    ///
    /// # Errors
    /// - `CacheError::Deserialization` if the stored value is not a cache entry
    pub fn try_get_item(&mut self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.storage.get_item(key) else {
            return Ok(None);
        };

        let entry: CacheEntry<T> = serde_json::from_str(&raw)?;
        if entry.is_expired(self.clock.now_ms()) {
            self.storage.remove_item(key);
            debug!(key, "purged expired entry");
            return Ok(None);
        }

        Ok(Some(entry.value))
    }
}

impl<T, B> Cache<T> for StorageCache<T, B>
where
    T: Serialize + DeserializeOwned,
    B: StorageBackend,
{
    // == Set ==
    fn set_item(&mut self, key: &str, value: T, ttl_seconds: u64) {
        let entry = CacheEntry::new(value, ttl_seconds, self.clock.now_ms());
        match serde_json::to_string(&entry) {
            Ok(raw) => self.storage.set_item(key, &raw),
            Err(err) => warn!(key, error = %err, "failed to serialize cache entry"),
        }
    }

    // == Get ==
    /// Unparseable values are purged and read as a miss.
    fn get_item(&mut self, key: &str) -> Option<T> {
        match self.try_get_item(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "discarding unreadable cache entry");
                self.storage.remove_item(key);
                None
            }
        }
    }

    // == Get All ==
    /// Scans the whole medium, evicting expired entries as it goes.
    fn get_all_items(&mut self) -> HashMap<String, T> {
        let now = self.clock.now_ms();
        let mut result = HashMap::new();

        for key in self.storage.keys() {
            let Some(raw) = self.storage.get_item(&key) else {
                continue;
            };

            // Foreign keys share the medium
            let Ok(entry) = serde_json::from_str::<CacheEntry<T>>(&raw) else {
                continue;
            };

            if entry.is_expired(now) {
                self.storage.remove_item(&key);
                debug!(key = %key, "evicted expired entry during scan");
            } else {
                result.insert(key, entry.value);
            }
        }

        result
    }

    // == Delete ==
    fn delete_item(&mut self, key: &str) {
        self.storage.remove_item(key);
    }

    // == Clear ==
    fn clear(&mut self) {
        self.storage.clear();
    }

    // == Size ==
    fn size(&self) -> usize {
        self.storage.len()
    }
}
