//! Translation Source Traits
//!
//! Seams between the grouped translation cache, the raw locale endpoints,
//! and the code that asks for translations.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Result, TransportResult};

// == Translation Source ==
/// Uncached supplier of localized strings.
#[async_trait]
pub trait TranslationSource: Send + Sync {
    /// Fetches the translation for a single key.
    ///
    /// `lang` is an ISO 639 code; `None` asks for the server's default.
    async fn translate(&self, key: &str, lang: Option<&str>) -> TransportResult<String>;

    /// Fetches every translation under `prefix` (which ends in `*`).
    async fn get_translations(
        &self,
        prefix: &str,
        lang: Option<&str>,
    ) -> TransportResult<HashMap<String, String>>;
}

// == Lang Service ==
/// Translation lookups bound to a configured language.
#[async_trait]
pub trait LangService: Send {
    /// Translates a single key. The key must not end in `*`.
    async fn translate(&mut self, key: &str) -> Result<String>;

    /// Returns every translation under `prefix`. The prefix must end in `*`.
    async fn get_translations(&mut self, prefix: &str) -> Result<HashMap<String, String>>;
}
