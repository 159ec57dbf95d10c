//! # transpdf
//!
//! Layout-preserving PDF translation for Rust.
//!
//! This library extracts positioned text from a PDF, translates it through
//! a LibreTranslate-compatible provider, and re-emits a new PDF that places
//! each translated line at (or near) its original position and font size.
//!
//! ## Quick Start
//!
//! ```no_run
//! use transpdf::Transpdf;
//! use std::path::Path;
//!
//! fn main() -> transpdf::Result<()> {
//!     let pipeline = Transpdf::new().build()?;
//!     let report = pipeline.run(Path::new("document.pdf"), "es", None);
//!     if report.success {
//!         println!("saved to {:?}", report.output_file);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Extract**: content-stream interpretation recovers blocks, lines, and
//!   styled runs with bounding boxes; sources without usable geometry
//!   degrade to raw per-page text.
//! - **Translate**: deterministic language detection over the document
//!   text, then per-line translation with sentence-aware chunking; a
//!   failing chunk keeps its original text rather than aborting the job.
//! - **Compose**: one output page per source page, translated text anchored
//!   at the original geometry with clamped font sizes, falling back to a
//!   margin anchor when a position is unusable.

pub mod compose;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod translate;

// Re-export commonly used types
pub use compose::{ComposeStats, DocumentComposer, PdfWriter};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use extract::{ErrorMode, ExtractMode, ExtractOptions, PdfExtractor};
pub use model::{
    Block, BoundingBox, Document, Line, Metadata, Page, Run, TranslatedDocument, TranslatedLine,
};
pub use pipeline::{JobReport, JobStats, TranslationPipeline};
pub use translate::{
    detect_language, HttpProvider, LanguageEntry, LanguageTable, TranslateOptions,
    TranslationProvider, TranslationService, DEFAULT_PROVIDER_URL,
};

use std::path::Path;

/// Extract the structural model from a PDF file.
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let extractor = PdfExtractor::open(path)?;
    extractor.extract()
}

/// Extract the structural model with custom options.
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<Document> {
    let extractor = PdfExtractor::open_with_options(path, options)?;
    extractor.extract()
}

/// Extract the structural model from in-memory bytes.
pub fn extract_bytes(data: &[u8]) -> Result<Document> {
    let extractor = PdfExtractor::from_bytes(data)?;
    extractor.extract()
}

/// Translate one PDF file against the default provider endpoint.
///
/// Convenience wrapper over [`Transpdf`]; fatal input errors are captured
/// in the returned report rather than surfaced as `Err`.
pub fn translate_file<P: AsRef<Path>>(path: P, target_lang: &str) -> Result<JobReport> {
    let pipeline = Transpdf::new().build()?;
    Ok(pipeline.run(path.as_ref(), target_lang, None))
}

/// Builder for a configured [`TranslationPipeline`].
///
/// # Example
///
/// ```no_run
/// use transpdf::Transpdf;
///
/// let pipeline = Transpdf::new()
///     .with_provider_url("http://localhost:5000")
///     .parallel(true)
///     .build()?;
/// # Ok::<(), transpdf::Error>(())
/// ```
pub struct Transpdf {
    provider_url: String,
    translate_options: TranslateOptions,
    extract_options: ExtractOptions,
}

impl Transpdf {
    /// Create a builder with defaults: public provider endpoint, lenient
    /// extraction with geometry, sequential translation.
    pub fn new() -> Self {
        Self {
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            translate_options: TranslateOptions::default(),
            extract_options: ExtractOptions::new().lenient(),
        }
    }

    /// Set the provider base URL.
    pub fn with_provider_url(mut self, url: impl Into<String>) -> Self {
        self.provider_url = url.into();
        self
    }

    /// Translate independent lines concurrently (order is still restored).
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.translate_options = self.translate_options.with_parallel(parallel);
        self
    }

    /// Skip geometry recovery and extract raw text only.
    pub fn text_only(mut self) -> Self {
        self.extract_options = self.extract_options.text_only();
        self
    }

    /// Fail instead of degrading when content streams cannot be parsed.
    pub fn strict(mut self) -> Self {
        self.extract_options = self.extract_options.with_error_mode(ErrorMode::Strict);
        self
    }

    /// Build the pipeline against the HTTP provider.
    ///
    /// The supported-language table is fetched here, once; if the provider
    /// is unreachable the built-in table is used.
    pub fn build(self) -> Result<TranslationPipeline> {
        let provider = HttpProvider::new(self.provider_url.clone())?;
        Ok(self.into_pipeline(Box::new(provider)))
    }

    /// Build the pipeline over an explicit provider (used by tests and
    /// embedders with their own transport).
    pub fn build_with_provider(self, provider: Box<dyn TranslationProvider>) -> TranslationPipeline {
        self.into_pipeline(provider)
    }

    fn into_pipeline(self, provider: Box<dyn TranslationProvider>) -> TranslationPipeline {
        let service = TranslationService::with_options(provider, self.translate_options);
        TranslationPipeline::new(service).with_extract_options(self.extract_options)
    }
}

impl Default for Transpdf {
    fn default() -> Self {
        Self::new()
    }
}
