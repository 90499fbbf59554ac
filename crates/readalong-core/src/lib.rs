//! Read-along speech playback: drives a speech engine over a piece of text
//! while tracking the spoken word in the coordinates of the full text, and
//! maps clicks in the rendered text back to seek positions.

pub mod controller;
pub mod engine;
pub mod highlight;
pub mod seek;
pub mod text_utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod fake;

pub use controller::{
    DEFAULT_RATE, MAX_RATE, MIN_RATE, PlaybackController, PlaybackNotice, PlaybackStatus,
    clamp_rate,
};
pub use engine::{BoundaryKind, EngineEvent, SpeechEngine, Utterance, UtteranceId};
pub use highlight::{HighlightRegion, Segments};
pub use seek::{ClickPoint, HitTarget, SegmentKind, resolve};
