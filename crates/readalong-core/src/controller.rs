//! Speech playback controller.
//!
//! The engine only ever sees a suffix of the source text, so every boundary
//! it reports is relative to wherever the current utterance started. The
//! controller keeps that start (`base_offset`) and the last reported relative
//! index, which together give the absolute position in the source text. Rate
//! changes and seeks are implemented by cancelling the utterance in flight
//! and submitting a fresh one from the desired absolute position.

use crate::engine::{BoundaryKind, EngineEvent, SpeechEngine, Utterance, UtteranceId};
use crate::text_utils;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

pub const MIN_RATE: f32 = 0.5;
pub const MAX_RATE: f32 = 3.0;
pub const DEFAULT_RATE: f32 = 1.0;

/// Clamp a requested rate into the supported range. NaN maps to the default.
pub fn clamp_rate(rate: f32) -> f32 {
    if rate.is_nan() {
        return DEFAULT_RATE;
    }
    rate.clamp(MIN_RATE, MAX_RATE)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Outcome of an operation or engine event that the caller has to render.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackNotice {
    /// Speech reached a new word at `absolute_index` of the source text.
    Boundary {
        absolute_index: usize,
        length: Option<usize>,
    },
    Ended,
    /// The engine gave up on the utterance; playback is back to idle.
    Failed { message: String },
}

pub struct PlaybackController<E> {
    engine: E,
    language: String,
    status: PlaybackStatus,
    rate: f32,
    source_text: String,
    source_len: usize,
    base_offset: usize,
    last_relative_index: usize,
    generation: u64,
    active: Option<UtteranceId>,
}

impl<E: SpeechEngine> PlaybackController<E> {
    pub fn new(engine: E, language: impl Into<String>) -> Self {
        Self {
            engine,
            language: language.into(),
            status: PlaybackStatus::Idle,
            rate: DEFAULT_RATE,
            source_text: String::new(),
            source_len: 0,
            base_offset: 0,
            last_relative_index: 0,
            generation: 0,
            active: None,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.status == PlaybackStatus::Paused
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn base_offset(&self) -> usize {
        self.base_offset
    }

    pub fn last_relative_index(&self) -> usize {
        self.last_relative_index
    }

    /// Position of the last reported word within the source text.
    pub fn absolute_index(&self) -> usize {
        self.base_offset + self.last_relative_index
    }

    pub fn active_utterance(&self) -> Option<UtteranceId> {
        self.active
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Start speaking `text` from char index `start_from_index`.
    ///
    /// Blank text is ignored without touching the engine. A start index at or
    /// past the end finishes immediately, as if the engine had reported the
    /// end of speech.
    pub fn speak(&mut self, text: &str, start_from_index: usize) -> Vec<PlaybackNotice> {
        if text.trim().is_empty() {
            debug!("Ignoring speak request for blank text");
            return Vec::new();
        }

        self.engine.cancel_all();
        self.active = None;

        let source_len = text_utils::char_len(text);
        let start = start_from_index.min(source_len);
        self.source_text = text.to_string();
        self.source_len = source_len;
        self.base_offset = start;
        self.last_relative_index = 0;

        let suffix = text_utils::suffix_from(text, start);
        if suffix.is_empty() {
            info!(start, source_len, "Start index is at the end of the text");
            return self.finish();
        }

        self.generation = self.generation.wrapping_add(1);
        let id = UtteranceId(self.generation);
        self.active = Some(id);
        info!(
            utterance = id.0,
            start,
            chars = source_len - start,
            rate = self.rate,
            language = %self.language,
            "Submitting utterance"
        );
        self.engine.submit(Utterance {
            id,
            text: suffix.to_string(),
            rate: self.rate,
            language: self.language.clone(),
        });
        Vec::new()
    }

    /// Safe to call in any state; always leaves the controller paused.
    pub fn pause(&mut self) {
        if self.status != PlaybackStatus::Playing {
            debug!(status = ?self.status, "Pause requested outside playback");
        } else {
            info!(at = self.absolute_index(), "Pausing playback");
        }
        self.engine.pause();
        self.status = PlaybackStatus::Paused;
    }

    /// Continue the utterance in flight unchanged, including its original
    /// rate.
    ///
    /// A pause issued while idle leaves the controller paused with no
    /// utterance behind it. Resuming from there makes no engine call and
    /// drops back to idle, so the status never reports playing while the
    /// engine has nothing to speak.
    pub fn resume(&mut self) {
        if self.active.is_none() {
            debug!(status = ?self.status, "Resume requested with no utterance in flight");
            self.status = PlaybackStatus::Idle;
            return;
        }
        info!(at = self.absolute_index(), "Resuming playback");
        self.engine.resume();
        self.status = PlaybackStatus::Playing;
    }

    pub fn stop(&mut self) {
        info!("Stopping playback");
        self.engine.cancel_all();
        self.reset_to_idle();
    }

    /// Record a new rate. While playing, restart from the last reported word
    /// so the change is audible right away; while paused, the rate waits for
    /// the next `speak`.
    pub fn change_rate(&mut self, new_rate: f32) -> Vec<PlaybackNotice> {
        let rate = clamp_rate(new_rate);
        self.rate = rate;

        match self.status {
            PlaybackStatus::Playing => {
                let restart_at = self.absolute_index();
                info!(rate, restart_at, "Rate changed during playback; restarting utterance");
                self.engine.cancel_all();
                let text = self.source_text.clone();
                self.speak(&text, restart_at)
            }
            PlaybackStatus::Paused => {
                info!(rate, "Rate changed while paused; deferred until next start");
                Vec::new()
            }
            PlaybackStatus::Idle => {
                debug!(rate, "Rate updated while idle");
                Vec::new()
            }
        }
    }

    /// Apply an event reported by the engine for utterance `id`.
    pub fn handle_engine_event(&mut self, id: UtteranceId, event: EngineEvent) -> Vec<PlaybackNotice> {
        if self.active != Some(id) {
            debug!(
                utterance = id.0,
                active = ?self.active.map(|active| active.0),
                ?event,
                "Discarding event from superseded utterance"
            );
            return Vec::new();
        }

        match event {
            EngineEvent::Start => {
                debug!(utterance = id.0, "Utterance started");
                self.status = PlaybackStatus::Playing;
                Vec::new()
            }
            EngineEvent::Boundary {
                kind,
                relative_index,
                length,
            } => self.on_boundary(kind, relative_index, length),
            EngineEvent::End => {
                info!(utterance = id.0, "Utterance finished");
                self.finish()
            }
            EngineEvent::Error { message } => {
                warn!(utterance = id.0, %message, "Speech engine error; abandoning playback");
                self.reset_to_idle();
                vec![PlaybackNotice::Failed { message }]
            }
        }
    }

    fn on_boundary(
        &mut self,
        kind: BoundaryKind,
        relative_index: usize,
        length: Option<usize>,
    ) -> Vec<PlaybackNotice> {
        if kind != BoundaryKind::Word {
            return Vec::new();
        }
        if self.status == PlaybackStatus::Idle {
            debug!(relative_index, "Discarding boundary while idle");
            return Vec::new();
        }

        let relative = relative_index.min(self.source_len - self.base_offset);
        self.last_relative_index = relative;
        let absolute_index = self.base_offset + relative;
        debug!(relative, absolute_index, ?length, "Word boundary");
        vec![PlaybackNotice::Boundary {
            absolute_index,
            length,
        }]
    }

    fn finish(&mut self) -> Vec<PlaybackNotice> {
        self.reset_to_idle();
        vec![PlaybackNotice::Ended]
    }

    fn reset_to_idle(&mut self) {
        self.status = PlaybackStatus::Idle;
        self.base_offset = 0;
        self.last_relative_index = 0;
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{EngineCall, FakeEngine};

    const FOX: &str = "the quick brown fox";

    fn controller() -> PlaybackController<FakeEngine> {
        PlaybackController::new(FakeEngine::new(), "pt-BR")
    }

    fn word(relative_index: usize, length: Option<usize>) -> EngineEvent {
        EngineEvent::Boundary {
            kind: BoundaryKind::Word,
            relative_index,
            length,
        }
    }

    fn start_playing(ctl: &mut PlaybackController<FakeEngine>, text: &str, from: usize) -> UtteranceId {
        ctl.speak(text, from);
        let id = ctl.engine().last_id().expect("utterance submitted");
        ctl.handle_engine_event(id, EngineEvent::Start);
        id
    }

    #[test]
    fn blank_text_is_ignored_without_engine_calls() {
        let mut ctl = controller();
        let notices = ctl.speak("   \n\t", 0);

        assert!(notices.is_empty());
        assert!(ctl.engine().calls.is_empty());
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn speak_cancels_before_submitting_suffix() {
        let mut ctl = controller();
        ctl.speak(FOX, 4);

        let calls = &ctl.engine().calls;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], EngineCall::CancelAll);
        let utterance = ctl.engine().last_submitted().expect("submitted");
        assert_eq!(utterance.text, "quick brown fox");
        assert_eq!(utterance.language, "pt-BR");
        assert!((utterance.rate - DEFAULT_RATE).abs() < f32::EPSILON);
        assert_eq!(ctl.base_offset(), 4);
    }

    #[test]
    fn start_event_moves_to_playing() {
        let mut ctl = controller();
        start_playing(&mut ctl, FOX, 0);
        assert!(ctl.is_playing());
    }

    #[test]
    fn boundary_reports_absolute_index() {
        let mut ctl = controller();
        let id = start_playing(&mut ctl, FOX, 4);

        let notices = ctl.handle_engine_event(id, word(6, Some(5)));

        assert_eq!(
            notices,
            vec![PlaybackNotice::Boundary {
                absolute_index: 10,
                length: Some(5)
            }]
        );
        assert_eq!(ctl.last_relative_index(), 6);
    }

    #[test]
    fn boundary_before_start_is_discarded() {
        let mut ctl = controller();
        ctl.speak(FOX, 4);
        let id = ctl.engine().last_id().expect("utterance submitted");

        let notices = ctl.handle_engine_event(id, word(6, Some(5)));

        assert!(notices.is_empty());
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        assert_eq!(ctl.last_relative_index(), 0);
        assert_eq!(ctl.active_utterance(), Some(id));

        ctl.handle_engine_event(id, EngineEvent::Start);
        assert_eq!(
            ctl.handle_engine_event(id, word(6, Some(5))),
            vec![PlaybackNotice::Boundary {
                absolute_index: 10,
                length: Some(5)
            }]
        );
    }

    #[test]
    fn boxed_engine_drives_playback() {
        let engine: Box<dyn SpeechEngine> = Box::new(FakeEngine::new());
        let mut ctl = PlaybackController::new(engine, "en-US");

        ctl.speak(FOX, 0);
        let id = ctl.active_utterance().expect("utterance in flight");
        ctl.handle_engine_event(id, EngineEvent::Start);
        assert!(ctl.is_playing());

        ctl.handle_engine_event(id, word(4, Some(5)));
        ctl.change_rate(2.0);
        let restarted = ctl.active_utterance().expect("restarted");
        assert_ne!(restarted, id);
        assert_eq!(ctl.base_offset(), 4);

        assert_eq!(
            ctl.handle_engine_event(restarted, EngineEvent::End),
            vec![PlaybackNotice::Ended]
        );
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn non_word_boundaries_are_ignored() {
        let mut ctl = controller();
        let id = start_playing(&mut ctl, FOX, 0);

        let notices = ctl.handle_engine_event(
            id,
            EngineEvent::Boundary {
                kind: BoundaryKind::Sentence,
                relative_index: 10,
                length: None,
            },
        );

        assert!(notices.is_empty());
        assert_eq!(ctl.last_relative_index(), 0);
    }

    #[test]
    fn boundary_past_end_is_clamped_to_text_length() {
        let mut ctl = controller();
        let id = start_playing(&mut ctl, FOX, 10);

        let notices = ctl.handle_engine_event(id, word(500, None));

        assert_eq!(
            notices,
            vec![PlaybackNotice::Boundary {
                absolute_index: FOX.len(),
                length: None
            }]
        );
    }

    #[test]
    fn rate_change_while_playing_restarts_from_last_word() {
        let mut ctl = controller();
        let id = start_playing(&mut ctl, FOX, 0);
        ctl.handle_engine_event(id, word(4, Some(5)));
        ctl.engine_mut().clear();

        ctl.change_rate(2.0);

        let submitted = ctl.engine().submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].text, "quick brown fox");
        assert!((submitted[0].rate - 2.0).abs() < f32::EPSILON);
        assert_eq!(ctl.engine().calls[0], EngineCall::CancelAll);
        assert_eq!(ctl.base_offset(), 4);
        assert_eq!(ctl.last_relative_index(), 0);
    }

    #[test]
    fn rate_change_after_seek_uses_absolute_position() {
        let mut ctl = controller();
        let id = start_playing(&mut ctl, FOX, 4);
        ctl.handle_engine_event(id, word(6, Some(5)));

        ctl.change_rate(1.5);

        let utterance = ctl.engine().last_submitted().expect("restarted");
        assert_eq!(utterance.text, "brown fox");
        assert_eq!(ctl.base_offset(), 10);
    }

    #[test]
    fn paused_rate_change_does_not_restart() {
        let mut ctl = controller();
        let id = start_playing(&mut ctl, FOX, 0);
        ctl.handle_engine_event(id, word(4, Some(5)));
        ctl.pause();
        ctl.engine_mut().clear();

        ctl.change_rate(2.0);

        assert!(ctl.engine().calls.is_empty());
        assert!((ctl.rate() - 2.0).abs() < f32::EPSILON);

        // Resume continues the old utterance at its old rate.
        ctl.resume();
        assert_eq!(ctl.engine().calls, vec![EngineCall::Resume]);
        assert_eq!(ctl.active_utterance(), Some(id));
        assert!(ctl.is_playing());
    }

    #[test]
    fn deferred_rate_applies_to_next_speak() {
        let mut ctl = controller();
        start_playing(&mut ctl, FOX, 0);
        ctl.pause();
        ctl.change_rate(2.5);

        ctl.speak(FOX, 10);

        let utterance = ctl.engine().last_submitted().expect("submitted");
        assert!((utterance.rate - 2.5).abs() < f32::EPSILON);
        assert_eq!(utterance.text, "brown fox");
    }

    #[test]
    fn rate_is_clamped() {
        let mut ctl = controller();
        ctl.change_rate(9.0);
        assert!((ctl.rate() - MAX_RATE).abs() < f32::EPSILON);
        ctl.change_rate(0.1);
        assert!((ctl.rate() - MIN_RATE).abs() < f32::EPSILON);
        ctl.change_rate(f32::NAN);
        assert!((ctl.rate() - DEFAULT_RATE).abs() < f32::EPSILON);
    }

    #[test]
    fn stop_resets_offsets_for_next_speak() {
        let mut ctl = controller();
        let id = start_playing(&mut ctl, FOX, 0);
        ctl.handle_engine_event(id, word(10, Some(5)));

        ctl.stop();

        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        assert_eq!(ctl.absolute_index(), 0);
        assert_eq!(ctl.active_utterance(), None);

        ctl.speak(FOX, 0);
        assert_eq!(ctl.base_offset(), 0);
        assert_eq!(ctl.engine().last_submitted().map(|u| u.text.as_str()), Some(FOX));
    }

    #[test]
    fn end_event_resets_and_notifies() {
        let mut ctl = controller();
        let id = start_playing(&mut ctl, FOX, 4);
        ctl.handle_engine_event(id, word(6, Some(5)));

        let notices = ctl.handle_engine_event(id, EngineEvent::End);

        assert_eq!(notices, vec![PlaybackNotice::Ended]);
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        assert_eq!(ctl.base_offset(), 0);
        assert_eq!(ctl.last_relative_index(), 0);
    }

    #[test]
    fn speak_at_end_of_text_finishes_without_submitting() {
        let mut ctl = controller();
        let notices = ctl.speak(FOX, FOX.len());

        assert_eq!(notices, vec![PlaybackNotice::Ended]);
        assert!(ctl.engine().submitted().is_empty());
        assert_eq!(ctl.engine().cancel_count(), 1);
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn start_index_past_end_is_clamped() {
        let mut ctl = controller();
        let notices = ctl.speak(FOX, 1_000);
        assert_eq!(notices, vec![PlaybackNotice::Ended]);
        assert_eq!(ctl.base_offset(), 0);
    }

    #[test]
    fn engine_error_is_terminal() {
        let mut ctl = controller();
        let id = start_playing(&mut ctl, FOX, 0);
        ctl.handle_engine_event(id, word(4, Some(5)));

        let notices = ctl.handle_engine_event(
            id,
            EngineEvent::Error {
                message: "synthesis-failed".to_string(),
            },
        );

        assert_eq!(
            notices,
            vec![PlaybackNotice::Failed {
                message: "synthesis-failed".to_string()
            }]
        );
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        assert_eq!(ctl.engine().submitted().len(), 1);
        assert!(ctl.handle_engine_event(id, word(10, None)).is_empty());
    }

    #[test]
    fn stale_end_does_not_reset_newer_utterance() {
        let mut ctl = controller();
        let old = start_playing(&mut ctl, FOX, 0);
        ctl.handle_engine_event(old, word(4, Some(5)));
        ctl.change_rate(2.0);
        let new = ctl.engine().last_id().expect("restarted");
        assert_ne!(old, new);
        ctl.handle_engine_event(new, EngineEvent::Start);
        ctl.handle_engine_event(new, word(6, Some(5)));

        let notices = ctl.handle_engine_event(old, EngineEvent::End);

        assert!(notices.is_empty());
        assert!(ctl.is_playing());
        assert_eq!(ctl.base_offset(), 4);
        assert_eq!(ctl.absolute_index(), 10);
    }

    #[test]
    fn stale_boundary_is_discarded() {
        let mut ctl = controller();
        let old = start_playing(&mut ctl, FOX, 0);
        start_playing(&mut ctl, FOX, 10);

        let notices = ctl.handle_engine_event(old, word(16, Some(3)));

        assert!(notices.is_empty());
        assert_eq!(ctl.last_relative_index(), 0);
        assert_eq!(ctl.base_offset(), 10);
    }

    #[test]
    fn events_after_stop_are_discarded() {
        let mut ctl = controller();
        let id = start_playing(&mut ctl, FOX, 0);
        ctl.stop();

        assert!(ctl.handle_engine_event(id, EngineEvent::End).is_empty());
        assert!(ctl.handle_engine_event(id, EngineEvent::Start).is_empty());
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn pause_is_safe_in_any_state() {
        let mut ctl = controller();
        ctl.pause();
        assert!(ctl.is_paused());
        assert_eq!(ctl.engine().pause_count(), 1);
    }

    #[test]
    fn resume_without_utterance_returns_to_idle() {
        let mut ctl = controller();
        ctl.pause();
        ctl.resume();

        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        assert_eq!(ctl.engine().resume_count(), 0);
    }

    #[test]
    fn rapid_rate_changes_leave_single_active_utterance() {
        let mut ctl = controller();
        let id = start_playing(&mut ctl, FOX, 0);
        ctl.handle_engine_event(id, word(4, Some(5)));

        ctl.change_rate(1.5);
        ctl.change_rate(2.0);
        ctl.change_rate(2.5);

        let submitted = ctl.engine().submitted();
        assert_eq!(submitted.len(), 4);
        assert!(submitted[1..].iter().all(|u| u.text == "quick brown fox"));
        assert_eq!(ctl.active_utterance(), Some(submitted[3].id));
    }

    #[test]
    fn absolute_index_stays_within_text_across_operations() {
        let text = "um dois três quatro cinco";
        let len = text_utils::char_len(text);
        let mut ctl = controller();

        for (start, relative) in [(0, 3), (3, 40), (20, 2), (24, 1), (8, 0)] {
            let id = start_playing(&mut ctl, text, start);
            for notice in ctl.handle_engine_event(id, word(relative, None)) {
                if let PlaybackNotice::Boundary { absolute_index, .. } = notice {
                    assert!(absolute_index <= len);
                }
            }
            ctl.change_rate(ctl.rate() + 0.25);
        }
    }
}
