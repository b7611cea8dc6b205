//! Locale Cache - expiring caches for repository translations
//!
//! Provides TTL caches over volatile and durable storage, and a translation
//! service that caches single keys and whole prefix groups.

pub mod cache;
pub mod config;
pub mod error;
pub mod i18n;

pub use cache::{Cache, MemoryCache, StorageCache};
pub use config::{CacheKind, Config};
pub use error::{CacheError, Result, TransportError};
pub use i18n::{CachedLangService, HttpLangService, LangService, TranslationSource};
