//! Document composition: original structure + translated lines → output
//! PDF bytes.
//!
//! One output page per original page in both modes. With geometry, each
//! translated line is anchored at its original line's position using the
//! first run's clamped font size; without geometry, lines flow top-down as
//! sequential paragraphs. Placement failures fall back to a default anchor
//! rather than aborting the page. Long translated text may overflow its
//! region; reflow is out of scope.

use serde::Serialize;

use crate::error::Result;
use crate::extract::DEGRADED_FONT_SIZE;
use crate::model::{Document, Page, TranslatedDocument, TranslatedPage};

use super::writer::{PdfWriter, PlacedLine};

/// Lower bound for placement font size.
pub const MIN_FONT_SIZE: f32 = 8.0;

/// Upper bound for placement font size.
pub const MAX_FONT_SIZE: f32 = 16.0;

/// Font size used when a line has no usable style or its anchor is invalid.
pub const FALLBACK_FONT_SIZE: f32 = 11.0;

/// Page margin for the fallback anchor and for degraded-mode flow.
pub const PAGE_MARGIN: f32 = 72.0;

/// Line spacing multiplier for degraded-mode flow.
const FLOW_LINE_SPACING: f32 = 1.4;

/// Counters describing how composition went.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ComposeStats {
    /// Output pages written
    pub pages: u32,
    /// Lines placed at their original anchor
    pub lines_placed: u32,
    /// Lines recovered via the fallback anchor
    pub fallback_lines: u32,
}

/// Composes the translated output document.
pub struct DocumentComposer;

impl DocumentComposer {
    /// Create a composer.
    pub fn new() -> Self {
        Self
    }

    /// Build the output PDF as bytes.
    ///
    /// Precondition: `translated` mirrors `original` page/block/line
    /// counts exactly (checked; a mismatch is fatal). Never writes to the
    /// filesystem.
    pub fn compose(
        &self,
        original: &Document,
        translated: &TranslatedDocument,
    ) -> Result<(Vec<u8>, ComposeStats)> {
        translated.check_shape(original)?;

        let mut writer = PdfWriter::new();
        let mut stats = ComposeStats::default();

        for (page, tpage) in original.pages.iter().zip(&translated.pages) {
            let placed = if original.geometry {
                self.place_anchored(page, tpage, &mut stats)
            } else {
                self.place_flowed(page, tpage, &mut stats)
            };

            writer.add_page(page.width, page.height, &placed)?;
            stats.pages += 1;
        }

        let bytes = writer.finish(&original.metadata)?;
        Ok((bytes, stats))
    }

    /// Rich mode: anchor each line at its original bounding box.
    fn place_anchored(
        &self,
        page: &Page,
        tpage: &TranslatedPage,
        stats: &mut ComposeStats,
    ) -> Vec<PlacedLine> {
        let mut placed = Vec::new();

        for (block, tblock) in page.blocks.iter().zip(&tpage.blocks) {
            for (line, tline) in block.lines.iter().zip(&tblock.lines) {
                let size = line
                    .primary_run()
                    .map(|r| r.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE))
                    .unwrap_or(FALLBACK_FONT_SIZE);

                let anchor = line.bbox.filter(|b| b.is_finite()).map(|b| {
                    // Baseline sits one font size below the top of the box
                    (b.x0, page.height - (b.y0 + size))
                });

                let valid = anchor
                    .map(|(x, y)| {
                        (0.0..=page.width).contains(&x) && (0.0..=page.height).contains(&y)
                    })
                    .unwrap_or(false);

                if let (true, Some((x, y))) = (valid, anchor) {
                    placed.push(PlacedLine {
                        text: tline.text.clone(),
                        x,
                        y,
                        font_size: size,
                    });
                    stats.lines_placed += 1;
                } else {
                    // Recovered placement: left margin, y clamped into page
                    let y = anchor
                        .map(|(_, y)| y.clamp(PAGE_MARGIN, page.height - PAGE_MARGIN))
                        .unwrap_or(page.height - PAGE_MARGIN);
                    log::debug!(
                        "page {}: default anchor for line starting {:?}",
                        page.index,
                        tline.text.chars().take(24).collect::<String>()
                    );
                    placed.push(PlacedLine {
                        text: tline.text.clone(),
                        x: PAGE_MARGIN,
                        y,
                        font_size: FALLBACK_FONT_SIZE,
                    });
                    stats.fallback_lines += 1;
                }
            }
        }

        placed
    }

    /// Degraded mode: flow lines top-down from the margin as sequential
    /// paragraphs, an extra half line between blocks. Overflow past the
    /// bottom margin is accepted.
    fn place_flowed(
        &self,
        page: &Page,
        tpage: &TranslatedPage,
        stats: &mut ComposeStats,
    ) -> Vec<PlacedLine> {
        let line_height = DEGRADED_FONT_SIZE * FLOW_LINE_SPACING;
        let mut cursor_y = page.height - PAGE_MARGIN;
        let mut placed = Vec::new();

        for (i, (block, tblock)) in page.blocks.iter().zip(&tpage.blocks).enumerate() {
            if i > 0 {
                cursor_y -= line_height * 0.5;
            }

            for (line, tline) in block.lines.iter().zip(&tblock.lines) {
                let size = line
                    .primary_run()
                    .map(|r| r.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE))
                    .unwrap_or(DEGRADED_FONT_SIZE);

                placed.push(PlacedLine {
                    text: tline.text.clone(),
                    x: PAGE_MARGIN,
                    y: cursor_y,
                    font_size: size,
                });
                stats.lines_placed += 1;
                cursor_y -= line_height;
            }
        }

        placed
    }
}

impl Default for DocumentComposer {
    fn default() -> Self {
        Self::new()
    }
}
