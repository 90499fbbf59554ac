//! Persisted user preferences.
//!
//! Values are strings stored under a name. The file-backed store keeps them
//! in one small TOML file (by default under `.cache/`). Only the speech rate
//! is persisted today.

use anyhow::{Context, Result};
use readalong_core::{MAX_RATE, MIN_RATE, clamp_rate};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const RATE_KEY: &str = "speech-rate";

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(data) => toml::from_str(&data)
                .with_context(|| format!("Parsing preferences at {}", self.path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err)
                .with_context(|| format!("Reading preferences at {}", self.path.display())),
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Creating preferences directory")?;
        }
        let contents = toml::to_string(values).context("Serializing preferences")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Writing preferences to {}", self.path.display()))
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut values) => values.remove(key),
            Err(err) => {
                warn!(key, "Ignoring unreadable preferences: {err:#}");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking new writes.
        let mut values = self.read_all().unwrap_or_default();
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut values = self.read_all().unwrap_or_default();
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

/// Stored rate, or `fallback` when nothing usable is stored. Unparsable or
/// out-of-range values are purged from the store.
pub fn load_rate<S: PreferenceStore + ?Sized>(store: &mut S, fallback: f32) -> f32 {
    let Some(raw) = store.get(RATE_KEY) else {
        debug!(fallback, "No stored speech rate");
        return fallback;
    };

    match raw.trim().parse::<f32>() {
        Ok(rate) if (MIN_RATE..=MAX_RATE).contains(&rate) => {
            info!(rate, "Restored speech rate");
            rate
        }
        _ => {
            warn!(value = %raw, fallback, "Discarding invalid stored speech rate");
            if let Err(err) = store.remove(RATE_KEY) {
                warn!("Failed to purge invalid speech rate: {err:#}");
            }
            fallback
        }
    }
}

/// Clamp and persist `rate`; storage failures are logged, never fatal.
pub fn save_rate<S: PreferenceStore + ?Sized>(store: &mut S, rate: f32) -> f32 {
    let clamped = clamp_rate(rate);
    if let Err(err) = store.set(RATE_KEY, &clamped.to_string()) {
        warn!(rate = clamped, "Failed to persist speech rate: {err:#}");
    }
    clamped
}
