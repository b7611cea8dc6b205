//! HTTP Lang Service
//!
//! Client for the repository's locale endpoints under `rsc/locale`.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

use crate::error::{CacheError, Result, TransportError, TransportResult};
use crate::i18n::TranslationSource;

/// Locale resource path, relative to the application base URL.
const API_PATH: [&str; 2] = ["rsc", "locale"];

// == Http Lang Service ==
/// Uncached translation source talking to a repository instance.
#[derive(Debug, Clone)]
pub struct HttpLangService {
    base_url: Url,
    client: Client,
}

impl HttpLangService {
    // == Constructor ==
    /// Creates a client for the application at `base_url`.
    ///
    /// # Errors
    /// - `CacheError::InvalidArgument` if `base_url` is not an absolute http(s) URL
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(base_url, Client::new())
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|err| CacheError::InvalidArgument(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CacheError::InvalidArgument(format!(
                "{base_url}: not a base URL"
            )));
        }
        // Keep the application path when joining segments
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // == Current Language ==
    /// Returns the server's current language as an ISO 639 code.
    pub async fn current_language(&self) -> TransportResult<String> {
        let response = self.get(self.url(&["language"])?).await?;
        Ok(response.text().await?)
    }

    // == Languages ==
    /// Returns every language the server offers.
    pub async fn languages(&self) -> TransportResult<Vec<String>> {
        let response = self.get(self.url(&["languages"])?).await?;
        Ok(response.json().await?)
    }

    /// Builds `<base>/rsc/locale/<segments...>`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> TransportResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Other(format!("{}: not a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(API_PATH)
            .extend(segments);
        Ok(url)
    }

    fn translation_url(&self, name: &str, lang: Option<&str>) -> TransportResult<Url> {
        match lang {
            Some(lang) => self.url(&["translate", lang, name]),
            None => self.url(&["translate", name]),
        }
    }

    async fn get(&self, url: Url) -> TransportResult<Response> {
        debug!(url = %url, "GET locale resource");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::from_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ));
        }

        Ok(response)
    }
}

#[async_trait]
impl TranslationSource for HttpLangService {
    async fn translate(&self, key: &str, lang: Option<&str>) -> TransportResult<String> {
        let response = self.get(self.translation_url(key, lang)?).await?;
        Ok(response.text().await?)
    }

    async fn get_translations(
        &self,
        prefix: &str,
        lang: Option<&str>,
    ) -> TransportResult<HashMap<String, String>> {
        let response = self.get(self.translation_url(prefix, lang)?).await?;
        Ok(response.json().await?)
    }
}
