//! Seam between the playback controller and a platform speech engine.
//!
//! Engines are stateful services with a single utterance in flight. Every
//! utterance carries an [`UtteranceId`]; the engine adapter must echo that id
//! back with each [`EngineEvent`] so the controller can drop events that
//! belong to an utterance it has already cancelled.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generation stamp of a submitted utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UtteranceId(pub u64);

/// One request handed to the engine: a suffix of the source text plus the
/// voice parameters to speak it with.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub rate: f32,
    pub language: String,
}

/// Granularity of a boundary notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    Word,
    Sentence,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    Start,
    /// `relative_index` counts chars from the start of the utterance text.
    Boundary {
        kind: BoundaryKind,
        relative_index: usize,
        length: Option<usize>,
    },
    End,
    Error {
        message: String,
    },
}

/// Operations the controller needs from a speech engine.
///
/// Pause, resume and cancel act on engine-global state, not on a particular
/// utterance.
pub trait SpeechEngine {
    fn submit(&mut self, utterance: Utterance);
    fn pause(&mut self);
    fn resume(&mut self);
    fn cancel_all(&mut self);
}

impl<E: SpeechEngine + ?Sized> SpeechEngine for Box<E> {
    fn submit(&mut self, utterance: Utterance) {
        (**self).submit(utterance);
    }

    fn pause(&mut self) {
        (**self).pause();
    }

    fn resume(&mut self) {
        (**self).resume();
    }

    fn cancel_all(&mut self) {
        (**self).cancel_all();
    }
}
