//! Click-to-seek: map a hit inside the rendered segments back to a char
//! index in the source text.
//!
//! The platform layer reports which node was hit and the offset inside that
//! node's text. The node is identified structurally when possible, otherwise
//! by comparing its full text against each segment.

use crate::highlight::Segments;
use crate::text_utils;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SegmentKind {
    Before,
    Current,
    After,
}

const SEGMENT_ORDER: [SegmentKind; 3] = [SegmentKind::Before, SegmentKind::Current, SegmentKind::After];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum HitTarget {
    /// Padding or margin of the view itself.
    Container,
    Segment { kind: SegmentKind },
    /// A text node, with the segment that owns it when the platform knows.
    TextNode {
        parent: Option<SegmentKind>,
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClickPoint {
    pub target: HitTarget,
    /// Char offset inside the hit node's text.
    pub offset: usize,
}

/// Absolute index for `click`, or `None` when the hit can't be placed.
pub fn resolve(click: &ClickPoint, segments: &Segments) -> Option<usize> {
    let Some(kind) = identify(&click.target, segments) else {
        debug!(target = ?click.target, "Click outside the reading segments; no seek");
        return None;
    };

    let before = text_utils::char_len(&segments.before);
    let current = text_utils::char_len(&segments.current);
    let (base, segment_len) = match kind {
        SegmentKind::Before => (0, before),
        SegmentKind::Current => (before, current),
        SegmentKind::After => (before + current, text_utils::char_len(&segments.after)),
    };
    let index = base + click.offset.min(segment_len);
    debug!(?kind, offset = click.offset, index, "Resolved click");
    Some(index)
}

fn identify(target: &HitTarget, segments: &Segments) -> Option<SegmentKind> {
    match target {
        HitTarget::Container => None,
        HitTarget::Segment { kind } => Some(*kind),
        HitTarget::TextNode {
            parent: Some(kind), ..
        } => Some(*kind),
        HitTarget::TextNode {
            parent: None,
            content,
        } => {
            if content.is_empty() {
                return None;
            }
            SEGMENT_ORDER
                .into_iter()
                .find(|kind| segments.segment(*kind) == content)
        }
    }
}
