//! Scripted engine for tests: records every call and never produces events
//! on its own. Tests fire events through the controller using the ids of the
//! recorded utterances.

use crate::engine::{SpeechEngine, Utterance, UtteranceId};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Submit(Utterance),
    Pause,
    Resume,
    CancelAll,
}

#[derive(Debug, Default)]
pub struct FakeEngine {
    pub calls: Vec<EngineCall>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> Vec<&Utterance> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Submit(utterance) => Some(utterance),
                _ => None,
            })
            .collect()
    }

    pub fn last_submitted(&self) -> Option<&Utterance> {
        self.submitted().into_iter().last()
    }

    pub fn last_id(&self) -> Option<UtteranceId> {
        self.last_submitted().map(|utterance| utterance.id)
    }

    pub fn cancel_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, EngineCall::CancelAll))
            .count()
    }

    pub fn pause_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, EngineCall::Pause))
            .count()
    }

    pub fn resume_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, EngineCall::Resume))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl SpeechEngine for FakeEngine {
    fn submit(&mut self, utterance: Utterance) {
        self.calls.push(EngineCall::Submit(utterance));
    }

    fn pause(&mut self) {
        self.calls.push(EngineCall::Pause);
    }

    fn resume(&mut self) {
        self.calls.push(EngineCall::Resume);
    }

    fn cancel_all(&mut self) {
        self.calls.push(EngineCall::CancelAll);
    }
}
