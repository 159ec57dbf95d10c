//! Block, line, and run types.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in page coordinate space.
///
/// Coordinates use a top-left origin with y growing downward; `x0,y0` is the
/// upper-left corner and `x1,y1` the lower-right. The composer converts to
/// PDF bottom-up user space when placing text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Whether all coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }
}

/// The smallest styled text unit: a run of text sharing one font, size,
/// and style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// The text content
    pub text: String,

    /// Base font name (e.g., "Helvetica-Bold"), when the source exposes it
    pub font_name: Option<String>,

    /// Font size in points
    pub font_size: f32,

    /// Whether the font appears to be bold
    pub bold: bool,

    /// Whether the font appears to be italic
    pub italic: bool,

    /// Fill color as RGB components in 0.0–1.0, when known
    pub color: Option<[f32; 3]>,
}

impl Run {
    /// Create a run with the given text and font size, no other styling.
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_name: None,
            font_size,
            bold: false,
            italic: false,
            color: None,
        }
    }

    /// Create a run with style flags inferred from the base font name.
    pub fn with_font(text: impl Into<String>, font_name: impl Into<String>, font_size: f32) -> Self {
        let font_name = font_name.into();
        let lower = font_name.to_lowercase();
        let bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let italic = lower.contains("italic") || lower.contains("oblique");

        Self {
            text: text.into(),
            font_name: Some(font_name),
            font_size,
            bold,
            italic,
            color: None,
        }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A translatable unit composed of one or more runs on a shared baseline.
///
/// `text` is the concatenation of the run texts; extraction guarantees it is
/// never empty or whitespace-only. Only the first run's style is used when
/// placing the translated text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    /// Combined text of all runs
    pub text: String,

    /// Bounding box, absent in degraded extraction
    pub bbox: Option<BoundingBox>,

    /// Styled runs in left-to-right order
    pub runs: Vec<Run>,
}

impl Line {
    /// Create a line from runs, deriving the combined text.
    pub fn from_runs(runs: Vec<Run>, bbox: Option<BoundingBox>) -> Self {
        let text = runs.iter().map(|r| r.text.as_str()).collect();
        Self { text, bbox, runs }
    }

    /// Create a degraded-mode line: one default-styled run, no geometry.
    pub fn plain(text: impl Into<String>, font_size: f32) -> Self {
        let text = text.into();
        let run = Run::new(text.clone(), font_size);
        Self {
            text,
            bbox: None,
            runs: vec![run],
        }
    }

    /// The representative style for placement: the first run.
    pub fn primary_run(&self) -> Option<&Run> {
        self.runs.first()
    }

    /// Check if the trimmed text is empty.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A grouping of lines sharing a layout region (e.g., a paragraph).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Bounding box union of the contained lines, absent in degraded mode
    pub bbox: Option<BoundingBox>,

    /// Lines in top-to-bottom order
    pub lines: Vec<Line>,
}

impl Block {
    /// Create a block from lines, deriving the bounding box union.
    pub fn from_lines(lines: Vec<Line>) -> Self {
        let bbox = lines
            .iter()
            .filter_map(|l| l.bbox)
            .reduce(|a, b| a.union(&b));
        Self { bbox, lines }
    }

    /// Check if the block has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_union() {
        let a = BoundingBox::new(10.0, 10.0, 50.0, 20.0);
        let b = BoundingBox::new(30.0, 5.0, 80.0, 15.0);
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(10.0, 5.0, 80.0, 20.0));
        assert_eq!(u.width(), 70.0);
        assert_eq!(u.height(), 15.0);
    }

    #[test]
    fn test_bbox_finite() {
        assert!(BoundingBox::new(0.0, 0.0, 1.0, 1.0).is_finite());
        assert!(!BoundingBox::new(f32::NAN, 0.0, 1.0, 1.0).is_finite());
        assert!(!BoundingBox::new(0.0, f32::INFINITY, 1.0, 1.0).is_finite());
    }

    #[test]
    fn test_run_style_inference() {
        let run = Run::with_font("Title", "Helvetica-Bold", 14.0);
        assert!(run.bold);
        assert!(!run.italic);

        let run = Run::with_font("aside", "Times-Oblique", 10.0);
        assert!(!run.bold);
        assert!(run.italic);
    }

    #[test]
    fn test_line_from_runs() {
        let line = Line::from_runs(
            vec![Run::new("Hello ", 12.0), Run::new("world", 12.0)],
            None,
        );
        assert_eq!(line.text, "Hello world");
        assert_eq!(line.primary_run().unwrap().font_size, 12.0);
        assert!(!line.is_blank());
    }

    #[test]
    fn test_block_bbox_union() {
        let l1 = Line::from_runs(
            vec![Run::new("a", 12.0)],
            Some(BoundingBox::new(72.0, 100.0, 120.0, 112.0)),
        );
        let l2 = Line::from_runs(
            vec![Run::new("b", 12.0)],
            Some(BoundingBox::new(72.0, 114.0, 200.0, 126.0)),
        );
        let block = Block::from_lines(vec![l1, l2]);
        assert_eq!(block.bbox, Some(BoundingBox::new(72.0, 100.0, 200.0, 126.0)));
    }

    #[test]
    fn test_block_without_geometry() {
        let block = Block::from_lines(vec![Line::plain("text", 12.0)]);
        assert!(block.bbox.is_none());
    }
}
