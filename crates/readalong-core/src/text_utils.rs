//! Char-indexed text helpers.
//!
//! Every offset handed around by the controller and the seek resolver counts
//! Unicode scalar values, not bytes, so slicing here never lands inside a
//! multi-byte character.

/// Number of chars in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte position of the char at `char_idx`, or `text.len()` when the index is
/// at or past the end.
pub fn byte_offset(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Suffix of `text` starting at `char_idx`; empty when the index is past the end.
pub fn suffix_from(text: &str, char_idx: usize) -> &str {
    &text[byte_offset(text, char_idx)..]
}

/// Chars in `[start, end)`, both clamped to the text.
pub fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, end.max(start));
    &text[start_byte..end_byte]
}

/// Distance from `char_idx` to the next whitespace char, or to the end of text.
pub fn distance_to_whitespace(text: &str, char_idx: usize) -> usize {
    suffix_from(text, char_idx)
        .chars()
        .take_while(|ch| !ch.is_whitespace())
        .count()
}
