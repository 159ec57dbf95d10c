//! Translation: language detection, the provider seam, chunking, and the
//! order-preserving document translation service.

mod chunk;
mod languages;
mod provider;
mod service;

pub use chunk::{build_chunks, split_sentences, CHUNK_LIMIT};
pub use languages::LanguageTable;
pub use provider::{HttpProvider, LanguageEntry, TranslationProvider, DEFAULT_PROVIDER_URL};
pub use service::{
    detect_language, Translated, TranslateOptions, TranslationService, DEFAULT_LANGUAGE,
};
