//! PDF extraction: source documents to the structural model.

mod extractor;
mod layout;
mod options;

pub use extractor::{PdfExtractor, DEGRADED_FONT_SIZE};
pub use layout::{LayoutAnalyzer, TextSpan};
pub use options::{ErrorMode, ExtractMode, ExtractOptions};
