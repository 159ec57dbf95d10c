//! Low-level PDF assembly for the composer.
//!
//! Builds the output document object by object: a shared Helvetica font
//! resource, one content stream per page of `BT/Tf/Tm/Tj/ET` operations,
//! the pages tree, catalog, and info dictionary. Font embedding and
//! matching are out of scope; text is encoded to WinAnsi lossily.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream, StringFormat};

use crate::error::{Error, Result};
use crate::model::Metadata;

/// A line ready for placement: text plus its anchor in PDF user space
/// (bottom-up y, `y` is the text baseline).
#[derive(Debug, Clone)]
pub struct PlacedLine {
    /// Text to show
    pub text: String,
    /// Left edge of the text
    pub x: f32,
    /// Baseline y
    pub y: f32,
    /// Font size in points
    pub font_size: f32,
}

/// Incremental PDF writer.
pub struct PdfWriter {
    doc: LopdfDocument,
    pages_id: ObjectId,
    font_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl PdfWriter {
    /// Create a writer with the shared font resource registered.
    pub fn new() -> Self {
        let mut doc = LopdfDocument::with_version("1.5");

        // Pages tree id is allocated up front so page objects can point to
        // their parent before the tree itself is written.
        let pages_id = doc.new_object_id();

        let mut font_dict = Dictionary::new();
        font_dict.set("Type", Object::Name(b"Font".to_vec()));
        font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        font_dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
        font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        let font_id = doc.add_object(Object::Dictionary(font_dict));

        Self {
            doc,
            pages_id,
            font_id,
            page_ids: Vec::new(),
        }
    }

    /// Append a page of the given size containing the placed lines.
    pub fn add_page(&mut self, width: f32, height: f32, lines: &[PlacedLine]) -> Result<()> {
        let mut content = Content {
            operations: Vec::new(),
        };

        content.operations.push(Operation::new("BT", vec![]));
        for line in lines {
            content.operations.push(Operation::new(
                "Tf",
                vec![Object::Name(b"F1".to_vec()), Object::Real(line.font_size)],
            ));
            content.operations.push(Operation::new(
                "Tm",
                vec![
                    Object::Real(1.0),
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(1.0),
                    Object::Real(line.x),
                    Object::Real(line.y),
                ],
            ));
            content.operations.push(Operation::new(
                "Tj",
                vec![Object::String(
                    encode_win_ansi(&line.text),
                    StringFormat::Literal,
                )],
            ));
        }
        content.operations.push(Operation::new("ET", vec![]));

        let encoded = content
            .encode()
            .map_err(|e| Error::Compose(e.to_string()))?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), encoded));

        let mut fonts = Dictionary::new();
        fonts.set("F1", Object::Reference(self.font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(self.pages_id));
        page_dict.set("Resources", Object::Dictionary(resources));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width),
                Object::Real(height),
            ]),
        );
        page_dict.set("Contents", Object::Reference(content_id));

        let page_id = self.doc.add_object(Object::Dictionary(page_dict));
        self.page_ids.push(page_id);

        Ok(())
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Write the pages tree, catalog, and info dictionary, then serialize
    /// the document to bytes. No file is touched; persisting the buffer is
    /// the caller's concern.
    pub fn finish(mut self, metadata: &Metadata) -> Result<Vec<u8>> {
        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|id| Object::Reference(*id))
            .collect();

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", Object::Integer(kids.len() as i64));
        pages_dict.set("Kids", Object::Array(kids));
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let mut catalog_dict = Dictionary::new();
        catalog_dict.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog_dict.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.doc.add_object(Object::Dictionary(catalog_dict));

        let mut info_dict = Dictionary::new();
        info_dict.set(
            "Producer",
            Object::string_literal(concat!("transpdf ", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(ref title) = metadata.title {
            info_dict.set("Title", Object::string_literal(title.as_str()));
        }
        if let Some(ref author) = metadata.author {
            info_dict.set("Author", Object::string_literal(author.as_str()));
        }
        let info_id = self.doc.add_object(Object::Dictionary(info_dict));

        self.doc.trailer.set("Root", Object::Reference(catalog_id));
        self.doc.trailer.set("Info", Object::Reference(info_id));

        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| Error::Compose(e.to_string()))?;
        Ok(buffer)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode text to WinAnsi (Windows-1252) bytes, lossily.
///
/// ASCII and Latin-1 pass through; the common typographic characters in the
/// 0x80–0x9F window are mapped; anything else becomes `?`. Control
/// whitespace becomes a plain space.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u8,
            '\n' | '\r' | '\t' => b' ',
            '\u{20AC}' => 0x80, // €
            '\u{201A}' => 0x82,
            '\u{2026}' => 0x85, // …
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8A,
            '\u{2039}' => 0x8B,
            '\u{0152}' => 0x8C,
            '\u{017D}' => 0x8E,
            '\u{2018}' => 0x91, // '
            '\u{2019}' => 0x92, // '
            '\u{201C}' => 0x93, // "
            '\u{201D}' => 0x94, // "
            '\u{2022}' => 0x95, // •
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99, // ™
            '\u{0161}' => 0x9A,
            '\u{203A}' => 0x9B,
            '\u{0153}' => 0x9C,
            '\u{017E}' => 0x9E,
            '\u{0178}' => 0x9F,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_win_ansi_ascii() {
        assert_eq!(encode_win_ansi("Hello!"), b"Hello!".to_vec());
    }

    #[test]
    fn test_encode_win_ansi_latin1() {
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
    }

    #[test]
    fn test_encode_win_ansi_typographic() {
        assert_eq!(encode_win_ansi("\u{2019}"), vec![0x92]);
        assert_eq!(encode_win_ansi("\u{2026}"), vec![0x85]);
    }

    #[test]
    fn test_encode_win_ansi_unencodable() {
        assert_eq!(encode_win_ansi("中"), vec![b'?']);
    }

    #[test]
    fn test_encode_win_ansi_whitespace_controls() {
        assert_eq!(encode_win_ansi("a\nb\tc"), b"a b c".to_vec());
    }

    #[test]
    fn test_writer_produces_valid_pdf_header() {
        let mut writer = PdfWriter::new();
        writer
            .add_page(
                595.0,
                842.0,
                &[PlacedLine {
                    text: "Hola mundo".into(),
                    x: 72.0,
                    y: 700.0,
                    font_size: 12.0,
                }],
            )
            .unwrap();
        assert_eq!(writer.page_count(), 1);

        let bytes = writer.finish(&Metadata::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }

    #[test]
    fn test_writer_page_count_matches() {
        let mut writer = PdfWriter::new();
        for _ in 0..3 {
            writer.add_page(595.0, 842.0, &[]).unwrap();
        }
        let bytes = writer.finish(&Metadata::default()).unwrap();

        let reparsed = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(reparsed.get_pages().len(), 3);
    }

    #[test]
    fn test_writer_round_trips_text() {
        let mut writer = PdfWriter::new();
        writer
            .add_page(
                595.0,
                842.0,
                &[PlacedLine {
                    text: "Round trip line".into(),
                    x: 72.0,
                    y: 700.0,
                    font_size: 12.0,
                }],
            )
            .unwrap();
        let bytes = writer.finish(&Metadata::default()).unwrap();

        let reparsed = lopdf::Document::load_mem(&bytes).unwrap();
        let text = reparsed.extract_text(&[1]).unwrap();
        assert!(text.contains("Round trip line"));
    }
}
