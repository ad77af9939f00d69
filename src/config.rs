//! Environment-derived configuration.

use serde::Deserialize;
use std::path::PathBuf;

/// Process configuration, extracted from the environment via figment.
/// Every field has a default, so the binary runs with no configuration at
/// all.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listen port.
    pub port: u16,
    /// Path to the lecture table CSV.
    pub data_path: PathBuf,
    /// Base log level for this crate's targets.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            data_path: PathBuf::from("data/lectures.csv"),
            log_level: "info".to_owned(),
        }
    }
}
