//! Document model types for PDF content representation.
//!
//! This module defines the intermediate representation (IR) that bridges
//! PDF extraction, translation, and composition. The structural hierarchy is
//! Document → Page → Block → Line → Run; a parallel Translated* hierarchy
//! mirrors it one-to-one on the output side.

mod block;
mod document;
mod translated;

pub use block::{Block, BoundingBox, Line, Run};
pub use document::{Document, Metadata, Page};
pub use translated::{TranslatedBlock, TranslatedDocument, TranslatedLine, TranslatedPage};
