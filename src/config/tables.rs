use super::defaults;
use super::models::{AppConfig, LogLevel};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    speech: SpeechConfig,
    #[serde(default)]
    storage: StorageConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            log_level: tables.logging.log_level,
            language: tables.speech.language,
            default_rate: readalong_core::clamp_rate(tables.speech.default_rate),
            preferences_path: tables.storage.preferences_path,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            logging: LoggingConfig {
                log_level: config.log_level,
            },
            speech: SpeechConfig {
                language: config.language.clone(),
                default_rate: config.default_rate,
            },
            storage: StorageConfig {
                preferences_path: config.preferences_path.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct SpeechConfig {
    #[serde(default = "defaults::default_language")]
    language: String,
    #[serde(default = "defaults::default_rate")]
    default_rate: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        SpeechConfig {
            language: defaults::default_language(),
            default_rate: defaults::default_rate(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct StorageConfig {
    #[serde(default = "defaults::default_preferences_path")]
    preferences_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            preferences_path: defaults::default_preferences_path(),
        }
    }
}
