//! Translation provider abstraction and the HTTP implementation.
//!
//! The trait isolates the external translation service from the rest of the
//! pipeline; tests substitute a counting mock.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default provider endpoint.
pub const DEFAULT_PROVIDER_URL: &str = "https://libretranslate.com";

/// Request timeout for provider calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A language offered by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageEntry {
    /// ISO 639-1 code (e.g., "en")
    pub code: String,
    /// Human-readable name (e.g., "English")
    pub name: String,
}

impl LanguageEntry {
    /// Create a language entry.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Abstract interface to the translation service.
///
/// Both methods return `Error::Provider` on any failure; callers recover
/// per the error policy (builtin language table, original-text fallback).
pub trait TranslationProvider: Send + Sync {
    /// Fetch the provider's supported languages.
    fn languages(&self) -> Result<Vec<LanguageEntry>>;

    /// Translate a single chunk of text.
    fn translate_chunk(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// [`TranslationProvider`] backed by the LibreTranslate-style HTTP API:
/// `GET /languages` and `POST /translate`.
pub struct HttpProvider {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpProvider {
    /// Create a provider against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Provider(e.to_string()))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { base_url, client })
    }

    /// Create a provider against the default endpoint.
    pub fn default_endpoint() -> Result<Self> {
        Self::new(DEFAULT_PROVIDER_URL)
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl TranslationProvider for HttpProvider {
    fn languages(&self) -> Result<Vec<LanguageEntry>> {
        let url = format!("{}/languages", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "GET /languages returned {}",
                response.status()
            )));
        }

        response
            .json::<Vec<LanguageEntry>>()
            .map_err(|e| Error::Provider(format!("malformed /languages body: {}", e)))
    }

    fn translate_chunk(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let url = format!("{}/translate", self.base_url);
        let body = TranslateRequest {
            q: text,
            source,
            target,
            format: "text",
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| Error::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "POST /translate returned {}",
                response.status()
            )));
        }

        let parsed: TranslateResponse = response
            .json()
            .map_err(|e| Error::Provider(format!("malformed /translate body: {}", e)))?;

        Ok(parsed.translated_text)
    }
}
