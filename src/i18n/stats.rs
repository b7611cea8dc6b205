//! Translation Statistics Module
//!
//! Counters kept by the grouped translation cache.

// == Translation Stats ==
/// Tracks how translation requests were served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationStats {
    /// Single keys served from the cache
    pub hits: u64,
    /// Single keys fetched from the source
    pub misses: u64,
    /// Single keys answered with the fallback marker
    pub fallbacks: u64,
    /// Groups served from the cache
    pub group_hits: u64,
    /// Groups fetched from the source
    pub group_fetches: u64,
}

impl TranslationStats {
    // == Constructor ==
    /// Creates a new TranslationStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the single-key hit rate.
    ///
    /// Returns hits / (hits + misses + fallbacks), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.fallbacks;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_fallback(&mut self) {
        self.fallbacks += 1;
    }

    pub fn record_group_hit(&mut self) {
        self.group_hits += 1;
    }

    pub fn record_group_fetch(&mut self) {
        self.group_fetches += 1;
    }
}
