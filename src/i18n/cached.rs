//! Grouped Translation Cache
//!
//! Caches single translations and whole prefix groups in one flat store.
//!
//! A group fetch for `prefix*` stores every member under its own key and
//! then a marker entry under the literal key `prefix*` with an empty value.
//! While the marker is live the group is answered from the store; once the
//! marker expires the whole group is fetched again, whatever the state of
//! its members.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::cache::Cache;
use crate::error::{CacheError, Result};
use crate::i18n::{LangService, TranslationSource, TranslationStats};

// == Public Constants ==
/// Trailing character that turns a key into a group prefix.
pub const GROUP_SUFFIX: char = '*';

/// Value stored under a group marker key.
pub const GROUP_MARKER_VALUE: &str = "";

/// Boxed string cache the service writes through.
pub type TranslationStore = Box<dyn Cache<String> + Send>;

/// Renderable stand-in for a translation that could not be fetched.
pub fn fallback_for(key: &str) -> String {
    format!("??{key}??")
}

/// True for keys reserved as group markers.
pub fn is_group_key(key: &str) -> bool {
    key.ends_with(GROUP_SUFFIX)
}

// == Lookup ==
/// Outcome of a single-key fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    Fetched(String),
    Fallback(String),
}

impl Lookup {
    fn into_value(self) -> String {
        match self {
            Lookup::Fetched(value) | Lookup::Fallback(value) => value,
        }
    }
}

// == Cached Lang Service ==
/// [`LangService`] backed by a [`TranslationSource`] and an optional cache.
///
/// Without a cache every call goes to the source. Concurrent misses for the
/// same key are not coalesced.
pub struct CachedLangService<S> {
    source: S,
    cache: Option<TranslationStore>,
    lang: Option<String>,
    ttl_seconds: u64,
    stats: TranslationStats,
}

impl<S: TranslationSource> CachedLangService<S> {
    // == Constructor ==
    /// Creates a service that always asks `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: None,
            lang: None,
            ttl_seconds: 0,
            stats: TranslationStats::new(),
        }
    }

    /// Creates a service caching into `cache`.
    pub fn with_cache(source: S, cache: impl Cache<String> + Send + 'static) -> Self {
        Self::new(source).cache(Box::new(cache))
    }

    /// Sets the cache to write through.
    pub fn cache(mut self, cache: TranslationStore) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the language passed to the source. `None` uses the server default.
    pub fn lang(mut self, lang: Option<String>) -> Self {
        self.lang = lang;
        self
    }

    /// Sets the TTL in seconds for everything this service stores. `0` never expires.
    pub fn ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> Option<&(dyn Cache<String> + Send + 'static)> {
        self.cache.as_deref()
    }

    pub fn store_mut(&mut self) -> Option<&mut (dyn Cache<String> + Send + 'static)> {
        self.cache.as_deref_mut()
    }

    pub fn stats(&self) -> &TranslationStats {
        &self.stats
    }

    // == Translate ==
    /// Translates a single key.
    ///
    /// With a cache configured a failed fetch never surfaces: the caller gets
    /// [`fallback_for`] the key and nothing is cached, so the next call retries.
    ///
    /// # Errors
    /// - `CacheError::InvalidArgument` if `key` ends in `*`
    /// - `CacheError::Transport` if the fetch fails and no cache is configured
    pub async fn translate(&mut self, key: &str) -> Result<String> {
        if is_group_key(key) {
            return Err(CacheError::InvalidArgument(format!(
                "Key must not end with '{GROUP_SUFFIX}': {key}"
            )));
        }

        if self.cache.is_none() {
            let value = self.source.translate(key, self.lang.as_deref()).await?;
            return Ok(value);
        }

        Ok(self.lookup(key).await.into_value())
    }

    async fn lookup(&mut self, key: &str) -> Lookup {
        let Self {
            source,
            cache,
            lang,
            ttl_seconds,
            stats,
        } = self;

        if let Some(value) = cache.as_mut().and_then(|cache| cache.get_item(key)) {
            debug!(key, "translation cache hit");
            stats.record_hit();
            return Lookup::Fetched(value);
        }

        match source.translate(key, lang.as_deref()).await {
            Ok(value) => {
                debug!(key, "translation cache miss, fetched");
                stats.record_miss();
                if let Some(cache) = cache.as_mut() {
                    cache.set_item(key, value.clone(), *ttl_seconds);
                }
                Lookup::Fetched(value)
            }
            Err(err) => {
                warn!(key, error = %err, "translation fetch failed, using fallback");
                stats.record_fallback();
                Lookup::Fallback(fallback_for(key))
            }
        }
    }

    // == Get Translations ==
    /// Returns every translation under `prefix`.
    ///
    /// Served from the cache while the group marker is live, otherwise
    /// fetched in one request and written back member by member.
    ///
    /// # Errors
    /// - `CacheError::InvalidArgument` if `prefix` does not end in `*`
    /// - `CacheError::Transport` if the group fetch fails
    pub async fn get_translations(&mut self, prefix: &str) -> Result<HashMap<String, String>> {
        if !is_group_key(prefix) {
            return Err(CacheError::InvalidArgument(format!(
                "Prefix must end with '{GROUP_SUFFIX}': {prefix}"
            )));
        }

        let Self {
            source,
            cache,
            lang,
            ttl_seconds,
            stats,
        } = self;

        let Some(cache) = cache.as_mut() else {
            let group = source.get_translations(prefix, lang.as_deref()).await?;
            return Ok(group);
        };

        if cache.has_item(prefix) {
            debug!(prefix, "translation group served from cache");
            stats.record_group_hit();
            return Ok(cached_group(&mut **cache, prefix));
        }

        let fetched = source.get_translations(prefix, lang.as_deref()).await?;
        stats.record_group_fetch();

        let stem = group_stem(prefix);
        let mut group = HashMap::with_capacity(fetched.len());
        for (key, value) in fetched {
            if is_group_key(&key) {
                warn!(
                    prefix,
                    key = %key,
                    "dropping group member that collides with a group marker"
                );
                continue;
            }
            if !key.starts_with(stem) {
                warn!(prefix, key = %key, "dropping group member outside the prefix");
                continue;
            }
            cache.set_item(&key, value.clone(), *ttl_seconds);
            group.insert(key, value);
        }
        cache.set_item(prefix, GROUP_MARKER_VALUE.to_string(), *ttl_seconds);

        info!(prefix, members = group.len(), "translation group fetched");
        Ok(group)
    }
}

/// `prefix` without its trailing `*`. Every group member starts with it.
fn group_stem(prefix: &str) -> &str {
    prefix.strip_suffix(GROUP_SUFFIX).unwrap_or(prefix)
}

/// Live entries under `prefix`, excluding the marker itself.
fn cached_group(
    cache: &mut (dyn Cache<String> + Send),
    prefix: &str,
) -> HashMap<String, String> {
    let stem = group_stem(prefix);
    cache
        .get_all_items()
        .into_iter()
        .filter(|(key, _)| key.starts_with(stem) && !is_group_key(key))
        .collect()
}

#[async_trait]
impl<S: TranslationSource> LangService for CachedLangService<S> {
    async fn translate(&mut self, key: &str) -> Result<String> {
        CachedLangService::translate(self, key).await
    }

    async fn get_translations(&mut self, prefix: &str) -> Result<HashMap<String, String>> {
        CachedLangService::get_translations(self, prefix).await
    }
}
