//! The translation pipeline: validate → extract → detect → translate →
//! compose → persist.
//!
//! Drives one document through the three pipeline stages and reports the
//! outcome as a structured [`JobReport`]. Fatal failures (unreadable
//! source, unsupported target language) produce a `success == false`
//! report with no output file; every recoverable failure downstream
//! degrades per policy and only shows up in the stats.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::compose::{ComposeStats, DocumentComposer};
use crate::detect::validate_source;
use crate::error::Result;
use crate::extract::{ExtractOptions, PdfExtractor};
use crate::translate::{detect_language, TranslationService};

/// Outcome of one translation job.
///
/// Mirrors what the original service surface returned to its callers:
/// a success flag, a human-readable message, display names for the two
/// languages, and the output path (absent on failure).
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    /// Whether the job produced an output document
    pub success: bool,
    /// Human-readable outcome message
    pub message: String,
    /// Detected source language display name (empty on failure)
    pub source_language: String,
    /// Target language display name
    pub target_language: String,
    /// Path of the produced document, if any
    pub output_file: Option<PathBuf>,
    /// Degradation counters
    pub stats: JobStats,
}

impl JobReport {
    fn failure(message: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            source_language: String::new(),
            target_language: target_language.into(),
            output_file: None,
            stats: JobStats::default(),
        }
    }
}

/// Counters carried into the report.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct JobStats {
    /// Output pages written
    pub pages: u32,
    /// Lines translated
    pub lines: u32,
    /// Lines where a translation chunk fell back to original text
    pub translation_fallbacks: u32,
    /// Lines placed at the fallback anchor
    pub placement_fallbacks: u32,
}

/// One-document translation pipeline over an immutable
/// [`TranslationService`].
pub struct TranslationPipeline {
    service: TranslationService,
    extract: ExtractOptions,
}

impl TranslationPipeline {
    /// Create a pipeline with lenient extraction defaults.
    pub fn new(service: TranslationService) -> Self {
        Self {
            service,
            extract: ExtractOptions::new().lenient(),
        }
    }

    /// Override extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract = options;
        self
    }

    /// The underlying translation service.
    pub fn service(&self) -> &TranslationService {
        &self.service
    }

    /// Translate one file, capturing fatal errors into the report.
    ///
    /// When `output` is `None`, the output lands next to the input as
    /// `<stem>_<target>_<timestamp>.pdf`.
    pub fn run(&self, input: &Path, target_lang: &str, output: Option<&Path>) -> JobReport {
        let target_display = self
            .service
            .languages()
            .display_or_code(target_lang)
            .to_string();

        match self.execute(input, target_lang, output) {
            Ok(report) => report,
            Err(e) => {
                log::error!("translation of {} failed: {}", input.display(), e);
                JobReport::failure(e.to_string(), target_display)
            }
        }
    }

    fn execute(&self, input: &Path, target_lang: &str, output: Option<&Path>) -> Result<JobReport> {
        validate_source(input)?;

        let languages = self.service.languages();
        if !languages.contains(target_lang) {
            return Err(crate::error::Error::UnsupportedLanguage(
                target_lang.to_string(),
            ));
        }

        let extractor = PdfExtractor::open_with_options(input, self.extract.clone())?;
        let document = extractor.extract()?;

        let source_lang = detect_language(&document.plain_text());
        log::info!(
            "detected source language {} for {}",
            source_lang,
            input.display()
        );

        let translated = self
            .service
            .translate_document(&document, &source_lang, target_lang);

        let (bytes, compose_stats) = DocumentComposer::new().compose(&document, &translated)?;

        let out_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(input, target_lang));
        persist(&out_path, &bytes)?;

        Ok(JobReport {
            success: true,
            message: "Translation completed successfully".to_string(),
            source_language: languages.display_or_code(&source_lang).to_string(),
            target_language: languages.display_or_code(target_lang).to_string(),
            output_file: Some(out_path),
            stats: job_stats(&translated, compose_stats),
        })
    }
}

fn job_stats(
    translated: &crate::model::TranslatedDocument,
    compose: ComposeStats,
) -> JobStats {
    JobStats {
        pages: compose.pages,
        lines: translated.line_count() as u32,
        translation_fallbacks: translated.fallback_line_count() as u32,
        placement_fallbacks: compose.fallback_lines,
    }
}

/// Collision-resistant output path: `<stem>_<target>_<timestamp>.pdf`
/// beside the input file.
fn default_output_path(input: &Path, target_lang: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    input.with_file_name(format!("{}_{}_{}.pdf", stem, target_lang, timestamp))
}

/// Write the composed bytes via a temporary sibling and rename, so a
/// failed write never leaves a partial output document behind.
fn persist(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("pdf.part");
    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
