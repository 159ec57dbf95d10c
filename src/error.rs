//! Error types for the transpdf library.

use std::io;
use thiserror::Error;

/// Result type alias for transpdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while translating a PDF document.
///
/// Only the input-side variants (`Io`, `UnknownFormat`, `UnsupportedVersion`,
/// `FileTooLarge`, `PdfParse`, `Encrypted`, `UnsupportedLanguage`) are ever
/// surfaced to a caller; `Provider` failures are recovered inside the
/// translation service and placement failures inside the composer.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The input file exceeds the ingestion size ceiling.
    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge {
        /// Actual file size in bytes
        size: u64,
        /// Configured ceiling in bytes
        limit: u64,
    },

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// The requested target language is not in the supported-language table.
    #[error("Unsupported target language: {0}")]
    UnsupportedLanguage(String),

    /// Translation provider call failed (non-success response, network
    /// error, or malformed body). Always recovered by the caller.
    #[error("Translation provider error: {0}")]
    Provider(String),

    /// The original and translated documents do not have matching
    /// page/block/line structure.
    #[error("Structure mismatch between original and translated documents: {0}")]
    StructureMismatch(String),

    /// Error assembling the output PDF.
    #[error("PDF composition error: {0}")]
    Compose(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl Error {
    /// Whether this error belongs to the unreadable-source family
    /// (missing, oversized, or unparseable input).
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::FileTooLarge { .. }
                | Error::PdfParse(_)
                | Error::Encrypted
                | Error::TextExtract(_)
        )
    }
}
