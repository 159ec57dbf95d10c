//! The translation service: language detection, chunked text translation
//! with per-chunk fallback, and order-preserving document translation.

use rayon::prelude::*;
use regex::Regex;
use whatlang::Lang;

use crate::model::{
    Document, TranslatedBlock, TranslatedDocument, TranslatedLine, TranslatedPage,
};
use crate::translate::chunk::{build_chunks, CHUNK_LIMIT};
use crate::translate::languages::LanguageTable;
use crate::translate::provider::TranslationProvider;

/// Detection runs on at most this many leading characters.
const DETECT_SAMPLE_CHARS: usize = 1000;

/// Language code returned when detection fails.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Result of translating one piece of text.
///
/// Translation never errors: chunks that fail at the provider substitute
/// their original text and are counted here, so callers (and tests) can
/// distinguish recovery from clean success.
#[derive(Debug, Clone)]
pub struct Translated {
    /// Output text, chunk results joined with single spaces
    pub text: String,
    /// Number of provider chunks the input produced (0 for empty input)
    pub chunks: u32,
    /// Chunks that fell back to their original text
    pub failed_chunks: u32,
}

impl Translated {
    /// Whether any chunk substituted its original text.
    pub fn used_fallback(&self) -> bool {
        self.failed_chunks > 0
    }

    fn passthrough(text: &str) -> Self {
        Self {
            text: text.to_string(),
            chunks: 0,
            failed_chunks: 0,
        }
    }
}

/// Options for the translation service.
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Translate independent lines concurrently. Output order is restored
    /// to input order regardless.
    pub parallel: bool,
}

impl TranslateOptions {
    /// Create options with defaults (sequential).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel line translation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Provider-backed translation service.
///
/// Holds the supported-language table, which is fetched once at
/// construction and immutable afterwards; the service itself is read-only
/// and safe to share.
pub struct TranslationService {
    provider: Box<dyn TranslationProvider>,
    languages: LanguageTable,
    options: TranslateOptions,
}

impl TranslationService {
    /// Create a service over the given provider with default options.
    pub fn new(provider: Box<dyn TranslationProvider>) -> Self {
        Self::with_options(provider, TranslateOptions::default())
    }

    /// Create a service with explicit options.
    pub fn with_options(provider: Box<dyn TranslationProvider>, options: TranslateOptions) -> Self {
        let languages = LanguageTable::from_provider(provider.as_ref());
        Self {
            provider,
            languages,
            options,
        }
    }

    /// The supported-language table.
    pub fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    /// Translate one piece of text from `source` to `target`.
    ///
    /// Empty or whitespace-only input is returned unchanged without any
    /// provider call. Input over the chunk limit is split on sentence
    /// boundaries and translated chunk by chunk; a failing chunk keeps its
    /// original text. This call always completes.
    pub fn translate(&self, text: &str, source: &str, target: &str) -> Translated {
        if text.trim().is_empty() {
            return Translated::passthrough(text);
        }

        if text.chars().count() <= CHUNK_LIMIT {
            return match self.provider.translate_chunk(text, source, target) {
                Ok(translated) => Translated {
                    text: translated,
                    chunks: 1,
                    failed_chunks: 0,
                },
                Err(e) => {
                    log::warn!("chunk translation failed, keeping original text: {}", e);
                    Translated {
                        text: text.to_string(),
                        chunks: 1,
                        failed_chunks: 1,
                    }
                }
            };
        }

        let chunks = build_chunks(text, CHUNK_LIMIT);
        let mut outputs = Vec::with_capacity(chunks.len());
        let mut failed = 0u32;

        for chunk in &chunks {
            match self.provider.translate_chunk(chunk, source, target) {
                Ok(translated) => outputs.push(translated),
                Err(e) => {
                    log::warn!("chunk translation failed, keeping original text: {}", e);
                    outputs.push(chunk.clone());
                    failed += 1;
                }
            }
        }

        Translated {
            text: outputs.join(" "),
            chunks: chunks.len() as u32,
            failed_chunks: failed,
        }
    }

    /// Translate every line of a document, producing exactly one
    /// [`TranslatedLine`] per source line in identical page/block/line
    /// order.
    ///
    /// Sequential by default; with [`TranslateOptions::parallel`] the
    /// independent line translations fan out over rayon, and the indexed
    /// collect restores input order before the structure is rebuilt.
    pub fn translate_document(
        &self,
        doc: &Document,
        source: &str,
        target: &str,
    ) -> TranslatedDocument {
        let texts: Vec<&str> = doc
            .pages
            .iter()
            .flat_map(|p| &p.blocks)
            .flat_map(|b| &b.lines)
            .map(|l| l.text.as_str())
            .collect();

        let translated: Vec<Translated> = if self.options.parallel {
            texts
                .par_iter()
                .map(|text| self.translate(text, source, target))
                .collect()
        } else {
            texts
                .iter()
                .map(|text| self.translate(text, source, target))
                .collect()
        };

        let mut results = translated.into_iter();
        let pages = doc
            .pages
            .iter()
            .map(|page| TranslatedPage {
                index: page.index,
                blocks: page
                    .blocks
                    .iter()
                    .map(|block| TranslatedBlock {
                        lines: block
                            .lines
                            .iter()
                            .map(|_| {
                                // One result per source line, in order
                                let t = results.next().unwrap_or_else(|| Translated {
                                    text: String::new(),
                                    chunks: 0,
                                    failed_chunks: 0,
                                });
                                let fallback = t.used_fallback();
                                TranslatedLine {
                                    text: t.text,
                                    fallback,
                                }
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        TranslatedDocument { pages }
    }
}

/// Detect the language of the given text, returning an ISO 639-1 code.
///
/// Punctuation is stripped and the sample capped at the first 1000
/// characters; detection is deterministic and best-effort, returning
/// [`DEFAULT_LANGUAGE`] on any failure rather than an error.
pub fn detect_language(text: &str) -> String {
    let sample: String = text.chars().take(DETECT_SAMPLE_CHARS).collect();
    let cleaned = Regex::new(r"[^\w\s]").unwrap().replace_all(&sample, " ");

    match whatlang::detect_lang(&cleaned) {
        Some(lang) => iso639_1(lang).to_string(),
        None => DEFAULT_LANGUAGE.to_string(),
    }
}

/// Map a detected language to its ISO 639-1 code.
///
/// Covers the languages the provider ecosystem commonly serves; anything
/// else falls back to English.
fn iso639_1(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Rus => "ru",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh",
        Lang::Ara => "ar",
        Lang::Hin => "hi",
        Lang::Nld => "nl",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Nob => "no",
        Lang::Fin => "fi",
        Lang::Pol => "pl",
        Lang::Ces => "cs",
        Lang::Hun => "hu",
        Lang::Tur => "tr",
        Lang::Ukr => "uk",
        Lang::Ell => "el",
        Lang::Heb => "he",
        Lang::Vie => "vi",
        Lang::Ind => "id",
        Lang::Tha => "th",
        Lang::Ron => "ro",
        Lang::Bul => "bg",
        Lang::Cat => "ca",
        Lang::Slk => "sk",
        Lang::Slv => "sl",
        Lang::Lit => "lt",
        Lang::Lav => "lv",
        Lang::Est => "et",
        Lang::Pes => "fa",
        Lang::Ben => "bn",
        Lang::Urd => "ur",
        Lang::Aze => "az",
        _ => DEFAULT_LANGUAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::model::{Block, Line, Page};
    use crate::translate::provider::LanguageEntry;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Provider that uppercases input and counts calls; chunks containing
    /// `fail_marker` error out. The call counter is shared so tests can
    /// assert on it after handing the provider to the service.
    struct MockProvider {
        calls: Arc<AtomicUsize>,
        fail_marker: Option<&'static str>,
    }

    impl MockProvider {
        fn new() -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: calls.clone(),
                    fail_marker: None,
                },
                calls,
            )
        }

        fn failing_on(marker: &'static str) -> (Self, Arc<AtomicUsize>) {
            let (mut provider, calls) = Self::new();
            provider.fail_marker = Some(marker);
            (provider, calls)
        }
    }

    impl TranslationProvider for MockProvider {
        fn languages(&self) -> Result<Vec<LanguageEntry>> {
            Ok(vec![
                LanguageEntry::new("en", "English"),
                LanguageEntry::new("es", "Spanish"),
            ])
        }

        fn translate_chunk(&self, text: &str, _source: &str, _target: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(marker) = self.fail_marker {
                if text.contains(marker) {
                    return Err(Error::Provider("simulated failure".into()));
                }
            }
            Ok(text.to_uppercase())
        }
    }

    #[test]
    fn test_empty_input_no_call() {
        let (provider, calls) = MockProvider::new();
        let svc = TranslationService::new(Box::new(provider));

        let out = svc.translate("", "en", "es");
        assert_eq!(out.text, "");
        assert_eq!(out.chunks, 0);

        let out = svc.translate("   ", "en", "es");
        assert_eq!(out.text, "   ");
        assert_eq!(out.chunks, 0);
        assert!(!out.used_fallback());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_short_input_single_call() {
        let (provider, calls) = MockProvider::new();
        let svc = TranslationService::new(Box::new(provider));

        let out = svc.translate("Hello world.", "en", "es");
        assert_eq!(out.text, "HELLO WORLD.");
        assert_eq!(out.chunks, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_long_input_chunked_calls() {
        let (provider, calls) = MockProvider::new();
        let svc = TranslationService::new(Box::new(provider));

        // Build input well over the chunk limit from many sentences
        let sentence = "This sentence is exactly long enough to matter for chunking purposes. ";
        let text = sentence.repeat(80); // ~5680 chars
        let out = svc.translate(text.trim_end(), "en", "es");

        let n = calls.load(Ordering::SeqCst);
        assert!(n >= 2, "expected multiple chunk calls, got {}", n);
        assert_eq!(out.chunks as usize, n);
        assert!(!out.used_fallback());
        // Chunk outputs joined with single spaces, all uppercased
        assert!(out.text.starts_with("THIS SENTENCE"));
        assert!(!out.text.contains("  "));
    }

    #[test]
    fn test_failed_chunk_keeps_original() {
        let (provider, _calls) = MockProvider::failing_on("poison");
        let svc = TranslationService::new(Box::new(provider));

        let good = "Good sentence here, fully translatable today. ".repeat(60); // ~2820 chars
        let text = format!("{}poison sentence stays. {}", good, good);
        let out = svc.translate(text.trim_end(), "en", "es");

        assert!(out.used_fallback());
        assert!(out.failed_chunks >= 1);
        assert!(out.failed_chunks < out.chunks);
        // Failed chunk keeps original (lowercase), others are uppercased
        assert!(out.text.contains("poison sentence stays."));
        assert!(out.text.contains("GOOD SENTENCE"));
    }

    #[test]
    fn test_translate_document_one_line_per_line() {
        let (provider, calls) = MockProvider::new();
        let svc = TranslationService::new(Box::new(provider));

        let mut doc = Document::new(false);
        let mut p1 = Page::a4(0);
        p1.add_block(Block::from_lines(vec![
            Line::plain("Hello world.", 12.0),
            Line::plain("Second line.", 12.0),
        ]));
        let mut p2 = Page::a4(1);
        p2.add_block(Block::from_lines(vec![Line::plain("Goodbye.", 12.0)]));
        doc.add_page(p1);
        doc.add_page(p2);

        let translated = svc.translate_document(&doc, "en", "es");
        translated.check_shape(&doc).unwrap();
        assert_eq!(translated.pages[0].blocks[0].lines[0].text, "HELLO WORLD.");
        assert_eq!(translated.pages[0].blocks[0].lines[1].text, "SECOND LINE.");
        assert_eq!(translated.pages[1].blocks[0].lines[0].text, "GOODBYE.");
        // One provider call per line, all inputs under the chunk limit
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_translate_document_parallel_preserves_order() {
        let (provider, _calls) = MockProvider::new();
        let svc = TranslationService::with_options(
            Box::new(provider),
            TranslateOptions::new().with_parallel(true),
        );

        let mut doc = Document::new(false);
        let mut page = Page::a4(0);
        let lines: Vec<Line> = (0..32)
            .map(|i| Line::plain(format!("line number {}", i), 12.0))
            .collect();
        page.add_block(Block::from_lines(lines));
        doc.add_page(page);

        let translated = svc.translate_document(&doc, "en", "es");
        translated.check_shape(&doc).unwrap();
        for (i, line) in translated.pages[0].blocks[0].lines.iter().enumerate() {
            assert_eq!(line.text, format!("LINE NUMBER {}", i));
        }
    }

    #[test]
    fn test_detect_language_deterministic() {
        let text = "The quick brown fox jumps over the lazy dog, and keeps on running.";
        let a = detect_language(text);
        let b = detect_language(text);
        assert_eq!(a, b);
        assert_eq!(a, "en");
    }

    #[test]
    fn test_detect_language_spanish() {
        let text = "El rápido zorro marrón salta sobre el perro perezoso en la mañana.";
        assert_eq!(detect_language(text), "es");
    }

    #[test]
    fn test_detect_language_empty_defaults() {
        assert_eq!(detect_language(""), DEFAULT_LANGUAGE);
        assert_eq!(detect_language("!!! ??? ..."), DEFAULT_LANGUAGE);
    }

    #[test]
    fn test_language_table_from_mock() {
        let (provider, _calls) = MockProvider::new();
        let svc = TranslationService::new(Box::new(provider));
        assert!(svc.languages().contains("es"));
        assert!(!svc.languages().contains("fr"));
    }
}
