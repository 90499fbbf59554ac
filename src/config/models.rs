use serde::Deserialize;

/// Effective configuration after table flattening and clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: LogLevel,
    /// BCP 47 tag passed to the engine with every utterance.
    pub language: String,
    /// Rate used when no valid preference has been stored yet.
    pub default_rate: f32,
    pub preferences_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: crate::config::defaults::default_log_level(),
            language: crate::config::defaults::default_language(),
            default_rate: crate::config::defaults::default_rate(),
            preferences_path: crate::config::defaults::default_preferences_path(),
        }
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
