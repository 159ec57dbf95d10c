//! Supported-language table.
//!
//! Built once at service construction from the provider's `/languages`
//! endpoint and immutable afterwards. When the endpoint is unreachable the
//! table falls back to a built-in set of common languages, so the system
//! stays usable without the remote service.

use std::collections::BTreeMap;

use crate::translate::provider::{LanguageEntry, TranslationProvider};

/// Built-in fallback when the provider's language list cannot be fetched.
const FALLBACK_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("nl", "Dutch"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("no", "Norwegian"),
    ("fi", "Finnish"),
    ("pl", "Polish"),
    ("cs", "Czech"),
    ("hu", "Hungarian"),
    ("tr", "Turkish"),
];

/// Code → display name table of supported languages, sorted by code.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    entries: BTreeMap<String, String>,
}

impl LanguageTable {
    /// Build the table from the provider, falling back to the built-in set
    /// on any failure. Never errors.
    pub fn from_provider(provider: &dyn TranslationProvider) -> Self {
        match provider.languages() {
            Ok(entries) if !entries.is_empty() => {
                log::debug!("language table loaded from provider ({} entries)", entries.len());
                Self::from_entries(entries)
            }
            Ok(_) => {
                log::warn!("provider returned an empty language list, using builtin table");
                Self::builtin()
            }
            Err(e) => {
                log::warn!("failed to fetch languages ({}), using builtin table", e);
                Self::builtin()
            }
        }
    }

    /// The built-in fallback table.
    pub fn builtin() -> Self {
        Self {
            entries: FALLBACK_LANGUAGES
                .iter()
                .map(|(c, n)| (c.to_string(), n.to_string()))
                .collect(),
        }
    }

    /// Build a table from explicit entries.
    pub fn from_entries(entries: Vec<LanguageEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.code, e.name)).collect(),
        }
    }

    /// Whether a language code is supported.
    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    /// Display name for a code, if present.
    pub fn display_name(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    /// Display name for a code, or the code itself when unknown.
    pub fn display_or_code<'a>(&'a self, code: &'a str) -> &'a str {
        self.display_name(code).unwrap_or(code)
    }

    /// Iterate (code, name) pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }

    /// Number of supported languages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty (never true in practice).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FailingProvider;

    impl TranslationProvider for FailingProvider {
        fn languages(&self) -> crate::error::Result<Vec<LanguageEntry>> {
            Err(Error::Provider("connection refused".into()))
        }

        fn translate_chunk(
            &self,
            _text: &str,
            _source: &str,
            _target: &str,
        ) -> crate::error::Result<String> {
            Err(Error::Provider("connection refused".into()))
        }
    }

    #[test]
    fn test_builtin_table_contains_english() {
        let table = LanguageTable::builtin();
        assert!(!table.is_empty());
        assert!(table.contains("en"));
        assert_eq!(table.display_name("en"), Some("English"));
        assert!(!table.contains("xx"));
    }

    #[test]
    fn test_fallback_on_provider_failure() {
        let table = LanguageTable::from_provider(&FailingProvider);
        assert!(!table.is_empty());
        assert!(table.contains("en"));
        assert!(table.contains("es"));
    }

    #[test]
    fn test_from_entries() {
        let table = LanguageTable::from_entries(vec![
            LanguageEntry::new("eo", "Esperanto"),
            LanguageEntry::new("en", "English"),
        ]);
        assert_eq!(table.len(), 2);
        assert!(table.contains("eo"));
        // Sorted by code
        let codes: Vec<&str> = table.iter().map(|(c, _)| c).collect();
        assert_eq!(codes, vec!["en", "eo"]);
    }

    #[test]
    fn test_display_or_code() {
        let table = LanguageTable::builtin();
        assert_eq!(table.display_or_code("fr"), "French");
        assert_eq!(table.display_or_code("zz"), "zz");
    }
}
