//! Composition: translated structural model to output PDF bytes.

mod composer;
mod writer;

pub use composer::{
    ComposeStats, DocumentComposer, FALLBACK_FONT_SIZE, MAX_FONT_SIZE, MIN_FONT_SIZE, PAGE_MARGIN,
};
pub use writer::{encode_win_ansi, PdfWriter, PlacedLine};
