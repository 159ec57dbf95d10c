//! PDF extraction: source file → structural document model.

use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::detect::detect_format_from_path;
use crate::error::{Error, Result};
use crate::model::{Block, Document, Line, Metadata, Page};

use super::layout::LayoutAnalyzer;
use super::options::{ErrorMode, ExtractMode, ExtractOptions};

/// Font size assigned to runs synthesized in degraded (text-only) mode.
pub const DEGRADED_FONT_SIZE: f32 = 12.0;

/// PDF document extractor.
///
/// Opens a source file and produces an ordered, page-by-page [`Document`]
/// of blocks, lines, and styled runs. The input is only read, never
/// mutated. Lines whose trimmed text is empty are never emitted.
pub struct PdfExtractor {
    doc: LopdfDocument,
    options: ExtractOptions,
}

impl PdfExtractor {
    /// Open a PDF file with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ExtractOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let path = path.as_ref();

        // Header sniff before handing the file to the parser
        detect_format_from_path(path)?;

        let doc = LopdfDocument::load(path).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;

        Ok(Self { doc, options })
    }

    /// Open a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ExtractOptions::default())
    }

    /// Open a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ExtractOptions) -> Result<Self> {
        crate::detect::detect_format_from_bytes(data)?;

        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;

        Ok(Self { doc, options })
    }

    /// Extract the structural model.
    ///
    /// In geometry mode a failure to interpret any page's content stream
    /// degrades the whole document to text-only extraction under
    /// [`ErrorMode::Lenient`], so the geometry flag stays single-valued.
    pub fn extract(&self) -> Result<Document> {
        match self.options.mode {
            ExtractMode::Geometry => match self.extract_geometry() {
                Ok(doc) => Ok(doc),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("geometry extraction failed ({}), degrading to text-only", e);
                    self.extract_text_only()
                }
                Err(e) => Err(e),
            },
            ExtractMode::TextOnly => self.extract_text_only(),
        }
    }

    /// Rich extraction: content-stream interpretation per page.
    fn extract_geometry(&self) -> Result<Document> {
        let mut document = Document::new(true);
        document.metadata = self.extract_metadata();

        let analyzer = LayoutAnalyzer::new(&self.doc);

        for (page_num, page_id) in self.doc.get_pages() {
            let (width, height) = self.page_dimensions(page_id);
            let mut page = Page::new(page_num - 1, width, height);

            for block in analyzer.extract_page_blocks(page_num, height)? {
                if !block.is_empty() {
                    page.add_block(block);
                }
            }

            log::debug!(
                "page {}: {} blocks extracted with geometry",
                page.index,
                page.blocks.len()
            );
            document.add_page(page);
        }

        document.metadata.page_count = document.page_count();
        Ok(document)
    }

    /// Degraded extraction: raw per-page text, one block per page, a single
    /// default-styled run per line, no geometry.
    fn extract_text_only(&self) -> Result<Document> {
        use unicode_normalization::UnicodeNormalization;

        let mut document = Document::new(false);
        document.metadata = self.extract_metadata();

        for (page_num, page_id) in self.doc.get_pages() {
            let (width, height) = self.page_dimensions(page_id);
            let mut page = Page::new(page_num - 1, width, height);

            let text = match self.doc.extract_text(&[page_num]) {
                Ok(text) => text,
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(Error::TextExtract(format!("page {}: {}", page_num, e)));
                    }
                    log::warn!("failed to extract text from page {}: {}", page_num, e);
                    String::new()
                }
            };

            let lines: Vec<Line> = text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| Line::plain(l.nfc().collect::<String>(), DEGRADED_FONT_SIZE))
                .collect();

            if !lines.is_empty() {
                page.add_block(Block::from_lines(lines));
            }
            document.add_page(page);
        }

        document.metadata.page_count = document.page_count();
        Ok(document)
    }

    /// Read title/author/version from the document info dictionary.
    fn extract_metadata(&self) -> Metadata {
        let mut metadata = Metadata::with_version(self.doc.version.to_string());

        if let Ok(info) = self.doc.trailer.get(b"Info") {
            if let Ok(info_ref) = info.as_reference() {
                if let Ok(info_dict) = self.doc.get_dictionary(info_ref) {
                    metadata.title = get_string_from_dict(info_dict, b"Title");
                    metadata.author = get_string_from_dict(info_dict, b"Author");
                }
            }
        }

        metadata
    }

    /// Page dimensions from MediaBox, defaulting to A4.
    fn page_dimensions(&self, page_id: lopdf::ObjectId) -> (f32, f32) {
        if let Ok(page_dict) = self.doc.get_dictionary(page_id) {
            if let Ok(media_box) = page_dict.get(b"MediaBox") {
                if let Ok(array) = media_box.as_array() {
                    if array.len() >= 4 {
                        let width = array[2].as_float().unwrap_or(595.0);
                        let height = array[3].as_float().unwrap_or(842.0);
                        return (width, height);
                    }
                }
            }
        }
        (595.0, 842.0)
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get the PDF version.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }
}

/// Helper to get a text string from a PDF dictionary.
fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        lopdf::Object::String(bytes, _) => {
            // UTF-16BE with BOM is the PDF convention for Unicode strings
            if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                let utf16: Vec<u16> = bytes[2..]
                    .chunks(2)
                    .filter_map(|c| {
                        if c.len() == 2 {
                            Some(u16::from_be_bytes([c[0], c[1]]))
                        } else {
                            None
                        }
                    })
                    .collect();
                String::from_utf16(&utf16).ok()
            } else {
                String::from_utf8(bytes.clone())
                    .ok()
                    .or_else(|| Some(bytes.iter().map(|&b| b as char).collect()))
            }
        }
        lopdf::Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    })
}
