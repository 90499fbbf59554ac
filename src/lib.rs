//! Read text aloud through a speech engine while tracking the spoken word.
//!
//! The playback state machine, highlight derivation and click-to-seek live in
//! `readalong-core`. This crate wires them to configuration, logging and the
//! persisted rate preference, and exposes [`ReaderSession`] as the surface a
//! rendering layer drives.

pub mod config;
pub mod logging;
pub mod prefs;
pub mod session;

pub use session::{
    RATE_PRESETS, ReaderCommand, ReaderEvent, ReaderSession, ReaderSnapshot, ViewMode,
    is_active_preset, open_reader, rate_label,
};

use readalong_core::SpeechEngine;
use std::path::Path;
use tracing::info;

/// Load `config_path`, apply its log level when a reload handle is given, and
/// open a session with the file-backed preference store.
pub fn bootstrap<E: SpeechEngine>(
    engine: E,
    config_path: &Path,
    log_handle: Option<&logging::ReloadHandle>,
) -> ReaderSession<E, prefs::FilePreferences> {
    let config = config::load_config(config_path);
    if let Some(handle) = log_handle {
        logging::set_log_level(handle, config.log_level.as_filter_str());
    }
    info!(
        level = %config.log_level,
        language = %config.language,
        default_rate = config.default_rate,
        "Active speech configuration"
    );
    open_reader(engine, &config)
}
