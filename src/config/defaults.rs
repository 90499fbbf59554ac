pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}

pub(crate) fn default_language() -> String {
    "pt-BR".to_string()
}

pub(crate) fn default_rate() -> f32 {
    readalong_core::DEFAULT_RATE
}

pub(crate) fn default_preferences_path() -> String {
    ".cache/preferences.toml".to_string()
}
