//! Configuration loading for the read-along reader.
//!
//! Settings live in `conf/config.toml` when present. Missing or invalid
//! entries fall back to defaults so playback still works without a file.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{AppConfig, LogLevel};
