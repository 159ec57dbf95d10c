//! Translated-document types: a parallel structure mirroring the source
//! model line-for-line.
//!
//! The translation service guarantees exactly one [`TranslatedLine`] per
//! source [`Line`](super::Line), in the same page/block/line order, so the
//! composer can zip the two structures positionally.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Document;

/// The translated counterpart of a [`Document`](super::Document).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedDocument {
    /// Pages, parallel to the source document's pages
    pub pages: Vec<TranslatedPage>,
}

impl TranslatedDocument {
    /// Verify this structure mirrors `original` page/block/line counts.
    ///
    /// The composer calls this before zipping; a mismatch indicates a bug
    /// upstream and is fatal.
    pub fn check_shape(&self, original: &Document) -> Result<()> {
        if self.pages.len() != original.pages.len() {
            return Err(Error::StructureMismatch(format!(
                "page count {} != {}",
                self.pages.len(),
                original.pages.len()
            )));
        }
        for (tp, op) in self.pages.iter().zip(&original.pages) {
            if tp.blocks.len() != op.blocks.len() {
                return Err(Error::StructureMismatch(format!(
                    "page {}: block count {} != {}",
                    op.index,
                    tp.blocks.len(),
                    op.blocks.len()
                )));
            }
            for (tb, ob) in tp.blocks.iter().zip(&op.blocks) {
                if tb.lines.len() != ob.lines.len() {
                    return Err(Error::StructureMismatch(format!(
                        "page {}: line count {} != {}",
                        op.index,
                        tb.lines.len(),
                        ob.lines.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Total number of translated lines.
    pub fn line_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.blocks)
            .map(|b| b.lines.len())
            .sum()
    }

    /// Number of lines where any chunk fell back to the original text.
    pub fn fallback_line_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.blocks)
            .flat_map(|b| &b.lines)
            .filter(|l| l.fallback)
            .count()
    }
}

/// The translated counterpart of a [`Page`](super::Page).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedPage {
    /// Source page index
    pub index: u32,

    /// Blocks, parallel to the source page's blocks
    pub blocks: Vec<TranslatedBlock>,
}

/// The translated counterpart of a [`Block`](super::Block).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedBlock {
    /// Lines, parallel to the source block's lines
    pub lines: Vec<TranslatedLine>,
}

/// The translated counterpart of a [`Line`](super::Line).
///
/// Positioning comes from the source line it mirrors; this type only holds
/// the translated text and the recovery marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedLine {
    /// Translated text (or original text where translation fell back)
    pub text: String,

    /// Whether any chunk of this line substituted its original text after
    /// a provider failure
    pub fallback: bool,
}

impl TranslatedLine {
    /// Create a successfully translated line.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fallback: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Line, Page};

    fn two_page_doc() -> Document {
        let mut doc = Document::new(false);
        let mut p1 = Page::a4(0);
        p1.add_block(Block::from_lines(vec![
            Line::plain("one", 12.0),
            Line::plain("two", 12.0),
        ]));
        let mut p2 = Page::a4(1);
        p2.add_block(Block::from_lines(vec![Line::plain("three", 12.0)]));
        doc.add_page(p1);
        doc.add_page(p2);
        doc
    }

    fn mirror(doc: &Document) -> TranslatedDocument {
        TranslatedDocument {
            pages: doc
                .pages
                .iter()
                .map(|p| TranslatedPage {
                    index: p.index,
                    blocks: p
                        .blocks
                        .iter()
                        .map(|b| TranslatedBlock {
                            lines: b
                                .lines
                                .iter()
                                .map(|l| TranslatedLine::new(l.text.clone()))
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_check_shape_ok() {
        let doc = two_page_doc();
        let translated = mirror(&doc);
        assert!(translated.check_shape(&doc).is_ok());
        assert_eq!(translated.line_count(), 3);
        assert_eq!(translated.fallback_line_count(), 0);
    }

    #[test]
    fn test_check_shape_detects_dropped_line() {
        let doc = two_page_doc();
        let mut translated = mirror(&doc);
        translated.pages[0].blocks[0].lines.pop();
        assert!(matches!(
            translated.check_shape(&doc),
            Err(Error::StructureMismatch(_))
        ));
    }

    #[test]
    fn test_check_shape_detects_dropped_page() {
        let doc = two_page_doc();
        let mut translated = mirror(&doc);
        translated.pages.pop();
        assert!(matches!(
            translated.check_shape(&doc),
            Err(Error::StructureMismatch(_))
        ));
    }

    #[test]
    fn test_fallback_count() {
        let doc = two_page_doc();
        let mut translated = mirror(&doc);
        translated.pages[1].blocks[0].lines[0].fallback = true;
        assert_eq!(translated.fallback_line_count(), 1);
    }
}
