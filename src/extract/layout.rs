//! Layout analysis: positioned text spans from PDF content streams.
//!
//! Interprets the text operators of a page's content stream with a text
//! matrix to recover spans carrying position, font size, font name, and fill
//! color, then groups spans into baseline lines and lines into blocks.
//! Block order is simple top-to-bottom; multi-column reading-order detection
//! is out of scope.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{Block, BoundingBox, Line, Run};

/// Average glyph width as a fraction of font size, used to estimate span
/// widths when no font metrics are loaded.
const AVG_GLYPH_WIDTH_RATIO: f32 = 0.5;

/// TJ adjustment (in 1/1000 text space units) above which a word space is
/// assumed.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A text span with position and style information, in PDF user space
/// (bottom-up y, baseline at `y`).
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Fill color active when the span was shown, RGB 0.0–1.0
    pub color: Option<[f32; 3]>,
}

impl TextSpan {
    fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let width = text.chars().count() as f32 * font_size * AVG_GLYPH_WIDTH_RATIO;
        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
            color: None,
        }
    }

    /// Approximate top of the glyph box (ascender).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }

    /// Approximate bottom of the glyph box (descender).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2
    }
}

/// Layout analyzer for one document.
pub struct LayoutAnalyzer<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    /// Extract structured blocks from a page, with bounding boxes converted
    /// to top-down page coordinates.
    pub fn extract_page_blocks(&self, page_num: u32, page_height: f32) -> Result<Vec<Block>> {
        let spans = self.extract_page_spans(page_num)?;
        let lines = group_spans_into_lines(spans);
        let model_lines: Vec<Line> = lines
            .into_iter()
            .map(|l| line_to_model(l, page_height))
            .filter(|l| !l.is_blank())
            .collect();
        Ok(group_lines_into_blocks(model_lines))
    }

    /// Extract raw text spans from a page with position and font info.
    pub fn extract_page_spans(&self, page_num: u32) -> Result<Vec<TextSpan>> {
        let pages = self.doc.get_pages();
        let page_id = pages
            .get(&page_num)
            .ok_or_else(|| Error::PdfParse(format!("page {} not found", page_num)))?;

        let lopdf_fonts = self
            .doc
            .get_page_fonts(*page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        // Resource name → base font name
        let mut base_fonts = HashMap::new();
        for (name, font) in &lopdf_fonts {
            let base = font
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            base_fonts.insert(name.clone(), base);
        }

        let content = self.page_content(*page_id)?;
        self.interpret_content(&content, &base_fonts, &lopdf_fonts)
    }

    /// Get the decompressed content stream bytes for a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = page_dict
            .get(b"Contents")
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        match contents {
            Object::Reference(r) => {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    return s
                        .decompressed_content()
                        .map_err(|e| Error::PdfParse(e.to_string()));
                }
                Err(Error::PdfParse("Invalid content stream".to_string()))
            }
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            if let Ok(data) = s.decompressed_content() {
                                content.extend_from_slice(&data);
                                content.push(b' ');
                            }
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// Walk the content operations, tracking the text matrix, current font,
    /// and fill color.
    fn interpret_content(
        &self,
        content: &[u8],
        base_fonts: &HashMap<Vec<u8>, String>,
        lopdf_fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    ) -> Result<Vec<TextSpan>> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut spans = Vec::new();
        let mut current_font = String::new();
        let mut current_font_name: Vec<u8> = Vec::new();
        let mut current_font_size: f32 = 12.0;
        let mut current_color: Option<[f32; 3]> = None;
        let mut text_matrix = TextMatrix::default();
        let mut in_text_block = false;

        for op in content.operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text_block = true;
                    text_matrix = TextMatrix::default();
                }
                "ET" => {
                    in_text_block = false;
                }
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(font_name) = &op.operands[0] {
                            current_font_name = font_name.clone();
                            current_font = base_fonts
                                .get(font_name.as_slice())
                                .cloned()
                                .unwrap_or_else(|| {
                                    String::from_utf8_lossy(font_name.as_slice()).to_string()
                                });
                        }
                        current_font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        text_matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        text_matrix.set(
                            get_number(&op.operands[0]).unwrap_or(1.0),
                            get_number(&op.operands[1]).unwrap_or(0.0),
                            get_number(&op.operands[2]).unwrap_or(0.0),
                            get_number(&op.operands[3]).unwrap_or(1.0),
                            get_number(&op.operands[4]).unwrap_or(0.0),
                            get_number(&op.operands[5]).unwrap_or(0.0),
                        );
                    }
                }
                "T*" => {
                    text_matrix.next_line();
                }
                "rg" => {
                    if op.operands.len() >= 3 {
                        current_color = Some([
                            get_number(&op.operands[0]).unwrap_or(0.0),
                            get_number(&op.operands[1]).unwrap_or(0.0),
                            get_number(&op.operands[2]).unwrap_or(0.0),
                        ]);
                    }
                }
                "g" => {
                    if let Some(v) = op.operands.first().and_then(get_number) {
                        current_color = Some([v, v, v]);
                    }
                }
                "Tj" | "TJ" => {
                    if in_text_block {
                        let font_dict = lopdf_fonts.get(&current_font_name).copied();

                        let text = if op.operator == "TJ" {
                            self.decode_tj_array(op.operands.first(), font_dict)
                        } else if let Some(Object::String(bytes, _)) = op.operands.first() {
                            self.decode_bytes(font_dict, bytes)
                        } else {
                            String::new()
                        };

                        if !text.trim().is_empty() {
                            let (x, y) = text_matrix.position();
                            let size = current_font_size * text_matrix.scale();
                            let mut span =
                                TextSpan::new(text, x, y, size, current_font.clone());
                            span.color = current_color;
                            spans.push(span);
                        }
                    }
                }
                "'" | "\"" => {
                    text_matrix.next_line();
                    if in_text_block {
                        let text_idx = if op.operator == "\"" { 2 } else { 0 };
                        if let Some(Object::String(bytes, _)) = op.operands.get(text_idx) {
                            let font_dict = lopdf_fonts.get(&current_font_name).copied();
                            let text = self.decode_bytes(font_dict, bytes);

                            if !text.trim().is_empty() {
                                let (x, y) = text_matrix.position();
                                let size = current_font_size * text_matrix.scale();
                                let mut span =
                                    TextSpan::new(text, x, y, size, current_font.clone());
                                span.color = current_color;
                                spans.push(span);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    /// Decode a text byte string using the font's encoding, falling back to
    /// simple decoding when the font or its encoding is unavailable.
    fn decode_bytes(&self, font_dict: Option<&lopdf::Dictionary>, bytes: &[u8]) -> String {
        if let Some(f) = font_dict {
            if let Ok(enc) = f.get_font_encoding(self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }

    /// Decode a TJ operand array: strings interleaved with kerning
    /// adjustments. Large negative adjustments are treated as word spaces.
    fn decode_tj_array(
        &self,
        operand: Option<&Object>,
        font_dict: Option<&lopdf::Dictionary>,
    ) -> String {
        let Some(Object::Array(arr)) = operand else {
            return String::new();
        };

        let mut combined = String::new();
        for item in arr {
            match item {
                Object::String(bytes, _) => {
                    combined.push_str(&self.decode_bytes(font_dict, bytes));
                }
                Object::Integer(n) => {
                    push_tj_space(&mut combined, -(*n as f32));
                }
                Object::Real(n) => {
                    push_tj_space(&mut combined, -n);
                }
                _ => {}
            }
        }
        combined
    }
}

fn push_tj_space(combined: &mut String, adjustment: f32) {
    if adjustment > TJ_SPACE_THRESHOLD
        && !combined.is_empty()
        && !combined.ends_with(' ')
        && !combined.ends_with('\u{00A0}')
    {
        if let Some(c) = combined.chars().last() {
            if !is_spaceless_script_char(c) {
                combined.push(' ');
            }
        }
    }
}

/// A baseline line of spans, still in PDF user space.
#[derive(Debug, Clone)]
struct SpanLine {
    spans: Vec<TextSpan>,
    y: f32,
}

/// Group spans into baseline lines: sort top-to-bottom then left-to-right,
/// and merge spans whose baselines are within 30% of the font size.
fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<SpanLine> {
    if spans.is_empty() {
        return vec![];
    }

    spans.sort_by(|a, b| {
        let y_cmp = b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut lines: Vec<SpanLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;

        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current.push(span),
            Some(y) => {
                lines.push(SpanLine {
                    spans: std::mem::take(&mut current),
                    y,
                });
                current_y = Some(span.y);
                current.push(span);
            }
            None => {
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if let (Some(y), false) = (current_y, current.is_empty()) {
        lines.push(SpanLine { spans: current, y });
    }

    lines
}

/// Convert a span line to a model [`Line`]: spans become runs (with
/// gap-derived spaces folded into the preceding run's text) and the
/// bounding box is the union of the span boxes flipped to top-down
/// coordinates.
fn line_to_model(line: SpanLine, page_height: f32) -> Line {
    use unicode_normalization::UnicodeNormalization;

    let mut spans = line.spans;
    spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    let mut runs: Vec<Run> = Vec::with_capacity(spans.len());
    let mut bbox: Option<BoundingBox> = None;

    for (i, span) in spans.iter().enumerate() {
        // Word gap between adjacent spans: append a space to the previous
        // run so the line text stays the exact concatenation of run texts.
        if i > 0 {
            let prev_span = &spans[i - 1];
            let gap = span.x - (prev_span.x + prev_span.width);
            let threshold = span.font_size * AVG_GLYPH_WIDTH_RATIO * 0.2;

            let prev_last = prev_span.text.chars().last();
            let curr_first = span.text.chars().next();
            let both_spaceless = prev_last.map(is_spaceless_script_char).unwrap_or(false)
                && curr_first.map(is_spaceless_script_char).unwrap_or(false);

            if gap > threshold && !both_spaceless && !span.text.starts_with(' ') {
                if let Some(prev) = runs.last_mut() {
                    if !prev.text.ends_with(' ') {
                        prev.text.push(' ');
                    }
                }
            }
        }

        let text: String = span.text.nfc().collect();
        let mut run = Run::with_font(text, span.font_name.clone(), span.font_size);
        run.color = span.color;
        runs.push(run);

        let span_box = BoundingBox::new(
            span.x,
            page_height - span.top(),
            span.x + span.width,
            page_height - span.bottom(),
        );
        bbox = Some(match bbox {
            Some(b) => b.union(&span_box),
            None => span_box,
        });
    }

    Line::from_runs(runs, bbox)
}

/// Group lines into blocks by vertical spacing and indentation shifts.
fn group_lines_into_blocks(lines: Vec<Line>) -> Vec<Block> {
    if lines.is_empty() {
        return vec![];
    }

    let avg_spacing = average_line_spacing(&lines);

    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Vec<Line> = Vec::new();

    for line in lines {
        let break_before = current
            .last()
            .map(|prev| should_break_block(prev, &line, avg_spacing))
            .unwrap_or(false);

        if break_before && !current.is_empty() {
            blocks.push(Block::from_lines(std::mem::take(&mut current)));
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(Block::from_lines(current));
    }

    blocks
}

fn average_line_spacing(lines: &[Line]) -> f32 {
    let tops: Vec<f32> = lines.iter().filter_map(|l| l.bbox.map(|b| b.y0)).collect();
    if tops.len() < 2 {
        return 12.0;
    }

    let spacings: Vec<f32> = tops
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &Line, curr: &Line, avg_spacing: f32) -> bool {
    let (Some(pb), Some(cb)) = (prev.bbox, curr.bbox) else {
        return false;
    };

    // Large vertical gap indicates a new paragraph
    if (cb.y0 - pb.y0).abs() > avg_spacing * 1.5 {
        return true;
    }

    // Significant font size change
    let prev_size = prev.primary_run().map(|r| r.font_size).unwrap_or(12.0);
    let curr_size = curr.primary_run().map(|r| r.font_size).unwrap_or(12.0);
    if (prev_size - curr_size).abs() > 1.0 {
        return true;
    }

    // Significant left margin change (indentation)
    if (pb.x0 - cb.x0).abs() > 20.0 {
        return true;
    }

    false
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        // Default leading; TL tracking is not needed for anchor recovery
        self.f -= 12.0 * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if a character is from a script that does not use word spaces
/// (Chinese ideographs, kana). Korean uses spaces and is excluded.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs + Extension A
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        // Hiragana, Katakana
        || (0x3040..=0x309F).contains(&code)
        || (0x30A0..=0x30FF).contains(&code)
        // CJK Symbols and Punctuation
        || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM marker
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
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32, size: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, size, "Helvetica".to_string())
    }

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_group_spans_same_baseline() {
        let spans = vec![span("world", 100.0, 700.0, 12.0), span("Hello", 72.0, 700.5, 12.0)];
        let lines = group_spans_into_lines(spans);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans.len(), 2);
    }

    #[test]
    fn test_group_spans_separate_baselines() {
        let spans = vec![span("first", 72.0, 700.0, 12.0), span("second", 72.0, 680.0, 12.0)];
        let lines = group_spans_into_lines(spans);
        assert_eq!(lines.len(), 2);
        // Top-to-bottom order
        assert_eq!(lines[0].spans[0].text, "first");
        assert_eq!(lines[1].spans[0].text, "second");
    }

    #[test]
    fn test_line_to_model_bbox_flip() {
        let line = SpanLine {
            spans: vec![span("Hello", 72.0, 700.0, 12.0)],
            y: 700.0,
        };
        let model = line_to_model(line, 842.0);
        let bbox = model.bbox.unwrap();
        assert_eq!(bbox.x0, 72.0);
        // top = 700 + 9.6 → y0 = 842 - 709.6
        assert!((bbox.y0 - 132.4).abs() < 0.01);
        assert!(bbox.y1 > bbox.y0);
    }

    #[test]
    fn test_line_to_model_inserts_word_gap() {
        // Second span starts well past the estimated end of the first
        let a = span("Hello", 72.0, 700.0, 12.0); // width = 5 * 6 = 30
        let b = span("world", 120.0, 700.0, 12.0);
        let line = SpanLine {
            spans: vec![a, b],
            y: 700.0,
        };
        let model = line_to_model(line, 842.0);
        assert_eq!(model.text, "Hello world");
    }

    #[test]
    fn test_block_break_on_large_gap() {
        let l1 = Line::from_runs(
            vec![Run::new("a", 12.0)],
            Some(BoundingBox::new(72.0, 100.0, 100.0, 112.0)),
        );
        let l2 = Line::from_runs(
            vec![Run::new("b", 12.0)],
            Some(BoundingBox::new(72.0, 114.0, 100.0, 126.0)),
        );
        let l3 = Line::from_runs(
            vec![Run::new("c", 12.0)],
            Some(BoundingBox::new(72.0, 180.0, 100.0, 192.0)),
        );
        let blocks = group_lines_into_blocks(vec![l1, l2, l3]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines.len(), 2);
        assert_eq!(blocks[1].lines.len(), 1);
    }

    #[test]
    fn test_tj_space_insertion() {
        let mut s = String::from("word");
        push_tj_space(&mut s, 250.0);
        assert_eq!(s, "word ");
        // Below threshold: no space
        let mut s = String::from("word");
        push_tj_space(&mut s, 100.0);
        assert_eq!(s, "word");
    }

    #[test]
    fn test_spaceless_script() {
        assert!(is_spaceless_script_char('中'));
        assert!(is_spaceless_script_char('あ'));
        assert!(!is_spaceless_script_char('a'));
        assert!(!is_spaceless_script_char('한'));
    }
}
