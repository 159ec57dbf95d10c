//! Sentence-aware chunking for provider request-size limits.
//!
//! Long text is split into sentence-like segments (after `.`, `!`, or `?`
//! followed by whitespace, punctuation staying with the preceding segment)
//! and segments are packed greedily into chunks that respect the limit.
//! A single segment longer than the limit forms its own over-limit chunk
//! rather than being split mid-sentence.

use regex::Regex;

/// Maximum characters sent to the provider in one translate call.
pub const CHUNK_LIMIT: usize = 4000;

/// Split text into sentence-like segments.
///
/// The boundary is a `.`, `!`, or `?` followed by whitespace; the
/// punctuation stays with the preceding segment and the whitespace is
/// consumed. Text without such a boundary is one segment.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let boundary = Regex::new(r"[.!?]\s+").unwrap();

    let mut segments = Vec::new();
    let mut start = 0;
    for m in boundary.find_iter(text) {
        // Keep the punctuation character, drop the trailing whitespace
        let end = m.start() + 1;
        let seg = &text[start..end];
        if !seg.is_empty() {
            segments.push(seg);
        }
        start = m.end();
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }

    segments
}

/// Greedily pack sentence segments into chunks of at most `limit`
/// characters (joined with single spaces), preserving order.
pub fn build_chunks(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for seg in split_sentences(text) {
        let seg_chars = seg.chars().count();

        if current.is_empty() {
            current.push_str(seg);
            current_chars = seg_chars;
        } else if current_chars + 1 + seg_chars <= limit {
            current.push(' ');
            current.push_str(seg);
            current_chars += 1 + seg_chars;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(seg);
            current_chars = seg_chars;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
