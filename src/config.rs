//! Configuration Module
//!
//! Handles loading and managing client configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::{FileStorage, MemoryCache, StorageCache};
use crate::error::{CacheError, Result};
use crate::i18n::TranslationStore;

/// Which store backs the translation cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    /// Process-lifetime cache
    Memory,
    /// JSON file that survives restarts
    File,
    /// Every lookup goes to the server
    Disabled,
}

impl FromStr for CacheKind {
    type Err = CacheError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheKind::Memory),
            "file" => Ok(CacheKind::File),
            "none" | "off" => Ok(CacheKind::Disabled),
            other => Err(CacheError::InvalidArgument(format!(
                "Unknown cache kind: {other}"
            ))),
        }
    }
}

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Application base URL the `rsc/locale` endpoints live under
    pub base_url: String,
    /// Language to request, None = server default
    pub lang: Option<String>,
    /// TTL in seconds for cached translations, 0 = never expires
    pub cache_ttl: u64,
    /// Cache backend
    pub cache_kind: CacheKind,
    /// Backing file for the file cache
    pub cache_file: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LOCALE_BASE_URL` - Application base URL (default: http://localhost:8291/mir/)
    /// - `LOCALE_LANG` - Language code (default: server default)
    /// - `LOCALE_CACHE_TTL` - Cache TTL in seconds (default: 0, never expires)
    /// - `LOCALE_CACHE` - `memory`, `file` or `none` (default: memory)
    /// - `LOCALE_CACHE_FILE` - File cache path (default: locale-cache.json)
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds a Config from any variable lookup. Unparseable values fall back
    /// to their defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            base_url: var("LOCALE_BASE_URL").unwrap_or(defaults.base_url),
            lang: var("LOCALE_LANG").filter(|lang| !lang.trim().is_empty()),
            cache_ttl: var("LOCALE_CACHE_TTL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl),
            cache_kind: var("LOCALE_CACHE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_kind),
            cache_file: var("LOCALE_CACHE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_file),
        }
    }

    /// Opens the configured translation store, or None when caching is disabled.
    ///
    /// A damaged cache file is set aside and the cache starts empty.
    ///
    /// # Errors
    /// - `CacheError::Storage` if the cache file exists but cannot be read
    pub fn open_store(&self) -> Result<Option<TranslationStore>> {
        let store: Option<TranslationStore> = match self.cache_kind {
            CacheKind::Memory => Some(Box::new(MemoryCache::<String>::new())),
            CacheKind::File => {
                let storage = FileStorage::open(&self.cache_file)?;
                Some(Box::new(StorageCache::<String, _>::new(storage)))
            }
            CacheKind::Disabled => None,
        };
        Ok(store)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8291/mir/".to_string(),
            lang: None,
            cache_ttl: 0,
            cache_kind: CacheKind::Memory,
            cache_file: PathBuf::from("locale-cache.json"),
        }
    }
}
