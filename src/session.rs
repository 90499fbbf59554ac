use crate::config::AppConfig;
use crate::prefs::{self, FilePreferences, PreferenceStore};
use readalong_core::{
    ClickPoint, EngineEvent, HighlightRegion, PlaybackController, PlaybackNotice, PlaybackStatus,
    Segments, SpeechEngine, UtteranceId, clamp_rate, seek,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use ts_rs::TS;

/// Speed shortcuts offered next to the rate slider.
pub const RATE_PRESETS: [f32; 4] = [0.75, 1.0, 1.5, 2.0];
const PRESET_TOLERANCE: f32 = 0.05;

pub fn is_active_preset(rate: f32, preset: f32) -> bool {
    (rate - preset).abs() < PRESET_TOLERANCE
}

pub fn rate_label(rate: f32) -> String {
    format!("{rate:.1}x")
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ViewMode {
    /// Plain text editor; shown whenever nothing is playing or paused.
    Editing,
    /// Three-segment highlighted view that accepts click-to-seek.
    Reading,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct RatePreset {
    pub value: f32,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ReaderSnapshot {
    pub text: String,
    pub view_mode: ViewMode,
    pub status: PlaybackStatus,
    pub rate: f32,
    pub rate_label: String,
    pub rate_presets: Vec<RatePreset>,
    pub highlight: HighlightRegion,
    #[ts(optional)]
    pub segments: Option<Segments>,
    #[ts(optional)]
    pub last_error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ReaderCommand {
    GetSnapshot,
    SetText { text: String },
    Play,
    Pause,
    TogglePlayPause,
    Stop,
    SetRate { rate: f32 },
    Click { point: ClickPoint },
    Engine { utterance: UtteranceId, event: EngineEvent },
}

impl ReaderCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSnapshot => "reader_get_snapshot",
            Self::SetText { .. } => "reader_set_text",
            Self::Play => "reader_play",
            Self::Pause => "reader_pause",
            Self::TogglePlayPause => "reader_toggle_play_pause",
            Self::Stop => "reader_stop",
            Self::SetRate { .. } => "reader_set_rate",
            Self::Click { .. } => "reader_click",
            Self::Engine { .. } => "reader_engine_event",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReaderEvent {
    pub action: &'static str,
    pub snapshot: ReaderSnapshot,
}

/// Text being read plus everything the view needs to render it: the
/// highlight of the spoken word, the playback controller and the stored
/// rate preference.
pub struct ReaderSession<E, P> {
    text: String,
    highlight_index: usize,
    highlight_length: usize,
    controller: PlaybackController<E>,
    preferences: P,
    last_error: Option<String>,
}

impl<E: SpeechEngine, P: PreferenceStore> ReaderSession<E, P> {
    pub fn new(engine: E, mut preferences: P, config: &AppConfig) -> Self {
        let mut controller = PlaybackController::new(engine, config.language.clone());
        let rate = prefs::load_rate(&mut preferences, config.default_rate);
        controller.change_rate(rate);
        Self {
            text: String::new(),
            highlight_index: 0,
            highlight_length: 0,
            controller,
            preferences,
            last_error: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn controller(&self) -> &PlaybackController<E> {
        &self.controller
    }

    pub fn preferences(&self) -> &P {
        &self.preferences
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn view_mode(&self) -> ViewMode {
        match self.controller.status() {
            PlaybackStatus::Idle => ViewMode::Editing,
            PlaybackStatus::Playing | PlaybackStatus::Paused => ViewMode::Reading,
        }
    }

    pub fn highlight(&self) -> HighlightRegion {
        HighlightRegion::derive(
            &self.text,
            self.highlight_index,
            Some(self.highlight_length),
        )
    }

    pub fn segments(&self) -> Segments {
        Segments::split(&self.text, self.highlight())
    }

    /// Replace the text. Only the editor can change it, so this is refused
    /// while the reading view is up.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        if self.view_mode() == ViewMode::Reading {
            debug!("Ignoring text edit while reading view is active");
            return false;
        }
        self.text = text.into();
        true
    }

    /// Resume a paused utterance, otherwise read the text from the start.
    pub fn play(&mut self) {
        self.last_error = None;
        if self.controller.is_paused() && self.controller.active_utterance().is_some() {
            self.controller.resume();
            return;
        }
        info!(chars = self.text.chars().count(), "Reading text from start");
        let text = self.text.clone();
        let notices = self.controller.speak(&text, 0);
        self.apply_notices(notices);
    }

    pub fn pause(&mut self) {
        self.controller.pause();
    }

    pub fn toggle_play_pause(&mut self) {
        if self.controller.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn stop(&mut self) {
        self.controller.stop();
        self.highlight_index = 0;
        self.highlight_length = 0;
    }

    pub fn set_rate(&mut self, rate: f32) {
        let clamped = clamp_rate(rate);
        let notices = self.controller.change_rate(clamped);
        self.apply_notices(notices);
        prefs::save_rate(&mut self.preferences, clamped);
    }

    /// Seek to wherever the user clicked in the reading view. Returns the
    /// resolved index, or `None` when the click could not be placed.
    pub fn click(&mut self, point: &ClickPoint) -> Option<usize> {
        if self.view_mode() != ViewMode::Reading {
            return None;
        }
        let index = seek::resolve(point, &self.segments())?;
        info!(index, "Seeking to clicked position");
        let text = self.text.clone();
        let notices = self.controller.speak(&text, index);
        self.apply_notices(notices);
        Some(index)
    }

    pub fn handle_engine_event(&mut self, utterance: UtteranceId, event: EngineEvent) {
        let notices = self.controller.handle_engine_event(utterance, event);
        self.apply_notices(notices);
    }

    pub fn snapshot(&self) -> ReaderSnapshot {
        let rate = self.controller.rate();
        let view_mode = self.view_mode();
        ReaderSnapshot {
            text: self.text.clone(),
            view_mode,
            status: self.controller.status(),
            rate,
            rate_label: rate_label(rate),
            rate_presets: RATE_PRESETS
                .iter()
                .map(|preset| RatePreset {
                    value: *preset,
                    label: format!("{preset}x"),
                    active: is_active_preset(rate, *preset),
                })
                .collect(),
            highlight: self.highlight(),
            segments: (view_mode == ViewMode::Reading).then(|| self.segments()),
            last_error: self.last_error.clone(),
        }
    }

    pub fn apply_command(&mut self, command: ReaderCommand) -> ReaderEvent {
        let action = command.action();
        match command {
            ReaderCommand::GetSnapshot => {}
            ReaderCommand::SetText { text } => {
                self.set_text(text);
            }
            ReaderCommand::Play => self.play(),
            ReaderCommand::Pause => self.pause(),
            ReaderCommand::TogglePlayPause => self.toggle_play_pause(),
            ReaderCommand::Stop => self.stop(),
            ReaderCommand::SetRate { rate } => self.set_rate(rate),
            ReaderCommand::Click { point } => {
                self.click(&point);
            }
            ReaderCommand::Engine { utterance, event } => {
                self.handle_engine_event(utterance, event)
            }
        }
        ReaderEvent {
            action,
            snapshot: self.snapshot(),
        }
    }

    fn apply_notices(&mut self, notices: Vec<PlaybackNotice>) {
        for notice in notices {
            match notice {
                PlaybackNotice::Boundary {
                    absolute_index,
                    length,
                } => {
                    self.highlight_index = absolute_index;
                    self.highlight_length = length.unwrap_or(0);
                }
                PlaybackNotice::Ended => {
                    self.highlight_index = 0;
                    self.highlight_length = 0;
                }
                PlaybackNotice::Failed { message } => {
                    warn!(%message, "Playback failed");
                    self.last_error = Some(message);
                }
            }
        }
    }
}

/// Build a session backed by the preference file named in `config`.
pub fn open_reader<E: SpeechEngine>(
    engine: E,
    config: &AppConfig,
) -> ReaderSession<E, FilePreferences> {
    let preferences = FilePreferences::new(&config.preferences_path);
    info!(
        language = %config.language,
        preferences = %preferences.path().display(),
        "Opening reader session"
    );
    ReaderSession::new(engine, preferences, config)
}
