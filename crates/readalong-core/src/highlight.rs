//! Highlight derivation for the word currently being spoken.
//!
//! The region is recomputed from the latest boundary every time it is needed
//! and never stored in the playback session.

use crate::seek::SegmentKind;
use crate::text_utils;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HighlightRegion {
    pub start: usize,
    pub len: usize,
}

impl HighlightRegion {
    /// Region for a word at `absolute_index`. Engines that report no length
    /// (or zero) get the span up to the next whitespace or end of text.
    pub fn derive(text: &str, absolute_index: usize, length: Option<usize>) -> Self {
        let text_len = text_utils::char_len(text);
        let start = absolute_index.min(text_len);
        let len = match length.filter(|len| *len > 0) {
            Some(len) => len.min(text_len - start),
            None => text_utils::distance_to_whitespace(text, start),
        };
        Self { start, len }
    }

    pub fn end(&self) -> usize {
        self.start.saturating_add(self.len)
    }
}

/// The three rendered pieces of the reading view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Segments {
    pub before: String,
    pub current: String,
    pub after: String,
}

impl Segments {
    pub fn split(text: &str, region: HighlightRegion) -> Self {
        let text_len = text_utils::char_len(text);
        if region.start >= text_len {
            return Self {
                before: text.to_string(),
                current: String::new(),
                after: String::new(),
            };
        }
        let end = region.end().min(text_len);
        Self {
            before: text_utils::slice_chars(text, 0, region.start).to_string(),
            current: text_utils::slice_chars(text, region.start, end).to_string(),
            after: text_utils::suffix_from(text, end).to_string(),
        }
    }

    pub fn segment(&self, kind: SegmentKind) -> &str {
        match kind {
            SegmentKind::Before => &self.before,
            SegmentKind::Current => &self.current,
            SegmentKind::After => &self.after,
        }
    }

    /// Total length in chars; equals the length of the text they were split from.
    pub fn char_len(&self) -> usize {
        text_utils::char_len(&self.before)
            + text_utils::char_len(&self.current)
            + text_utils::char_len(&self.after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_length_falls_back_to_next_space() {
        let region = HighlightRegion::derive("hello world", 0, None);
        assert_eq!(region, HighlightRegion { start: 0, len: 5 });
    }

    #[test]
    fn zero_length_is_treated_as_missing() {
        let region = HighlightRegion::derive("hello world", 6, Some(0));
        assert_eq!(region, HighlightRegion { start: 6, len: 5 });
    }

    #[test]
    fn reported_length_is_clamped_to_text() {
        let region = HighlightRegion::derive("hello world", 6, Some(50));
        assert_eq!(region, HighlightRegion { start: 6, len: 5 });
    }

    #[test]
    fn split_produces_three_segments() {
        let text = "alpha beta gamma";
        let segments = Segments::split(text, HighlightRegion::derive(text, 6, Some(4)));

        assert_eq!(segments.before, "alpha ");
        assert_eq!(segments.current, "beta");
        assert_eq!(segments.after, " gamma");
        assert_eq!(segments.char_len(), text.len());
    }

    #[test]
    fn oversized_region_is_clamped_when_splitting() {
        let region = HighlightRegion {
            start: 6,
            len: usize::MAX,
        };
        assert_eq!(region.end(), usize::MAX);

        let segments = Segments::split("alpha beta", region);
        assert_eq!(segments.before, "alpha ");
        assert_eq!(segments.current, "beta");
        assert!(segments.after.is_empty());
    }

    #[test]
    fn index_at_end_keeps_whole_text_before() {
        let text = "alpha beta";
        let segments = Segments::split(text, HighlightRegion { start: 10, len: 0 });

        assert_eq!(segments.before, text);
        assert!(segments.current.is_empty());
        assert!(segments.after.is_empty());
    }

    #[test]
    fn split_handles_accented_text() {
        let text = "ação rápida já";
        let segments = Segments::split(text, HighlightRegion::derive(text, 5, None));

        assert_eq!(segments.before, "ação ");
        assert_eq!(segments.current, "rápida");
        assert_eq!(segments.after, " já");
    }
}
