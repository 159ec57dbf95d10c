//! Document and page-level types.

use super::Block;
use serde::{Deserialize, Serialize};

/// A parsed source document: the structural model the extractor produces
/// and the translator and composer consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Pages in document order
    pub pages: Vec<Page>,

    /// Whether pages carry positional geometry (rich extraction) or only
    /// raw text per line (degraded extraction). The composer branches on
    /// this single flag.
    pub geometry: bool,
}

impl Document {
    /// Create a new empty document.
    pub fn new(geometry: bool) -> Self {
        Self {
            metadata: Metadata::default(),
            pages: Vec::new(),
            geometry,
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of lines across all pages.
    pub fn line_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.blocks)
            .map(|b| b.lines.len())
            .sum()
    }

    /// Concatenated text of every line, space-separated, in reading order.
    ///
    /// Used as the language-detection input.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for page in &self.pages {
            for block in &page.blocks {
                for line in &block.lines {
                    out.push_str(&line.text);
                    out.push(' ');
                }
            }
        }
        out
    }
}

/// A single page in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-based, stable; determines output page order)
    pub index: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Text blocks in top-to-bottom order
    pub blocks: Vec<Block>,
}

impl Page {
    /// Create a new page with the given dimensions.
    pub fn new(index: u32, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Create a new page with standard A4 size (210 x 297 mm).
    pub fn a4(index: u32) -> Self {
        Self::new(index, 595.0, 842.0)
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Check if the page has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Source document metadata, carried into the output PDF's Info dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// PDF version (e.g., "1.7")
    pub pdf_version: String,

    /// Total number of pages
    pub page_count: u32,
}

impl Metadata {
    /// Create new metadata with PDF version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Line;

    #[test]
    fn test_document_new() {
        let doc = Document::new(true);
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
        assert!(doc.geometry);
    }

    #[test]
    fn test_plain_text_order() {
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

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.plain_text(), "Hello world. Second line. Goodbye. ");
    }

    #[test]
    fn test_page_a4() {
        let page = Page::a4(0);
        assert_eq!(page.width, 595.0);
        assert_eq!(page.height, 842.0);
        assert!(page.is_empty());
    }
}
