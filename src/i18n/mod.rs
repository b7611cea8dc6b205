//! I18n Module
//!
//! Translation lookups against the repository's locale endpoints, with an
//! optional grouped cache in front.
//!
//! # Components
//! - `HttpLangService` - raw `rsc/locale` client
//! - `CachedLangService` - single-key and prefix-group caching on top of any source

mod cached;
mod http;
mod source;
mod stats;

pub use cached::{
    fallback_for, is_group_key, CachedLangService, TranslationStore, GROUP_MARKER_VALUE,
    GROUP_SUFFIX,
};
pub use http::HttpLangService;
pub use source::{LangService, TranslationSource};
pub use stats::TranslationStats;
