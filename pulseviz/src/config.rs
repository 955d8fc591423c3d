//! Runtime settings.
//!
//! Defaults come from the environment (a `.env` file is loaded if present);
//! command-line flags override them. The input CSV path is never configured
//! here: it is always passed explicitly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logs::LogFormat;

/// Report output directory.
pub const OUTPUT_DIR_VAR: &str = "PULSEVIZ_OUTPUT_DIR";

/// Pivot view cache directory.
pub const CACHE_DIR_VAR: &str = "PULSEVIZ_CACHE_DIR";

/// `text` or `json`.
pub const LOG_FORMAT_VAR: &str = "PULSEVIZ_LOG_FORMAT";

pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const DEFAULT_CACHE_DIR: &str = ".pulseviz/views";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            log_format: LogFormat::Text,
        }
    }
}

impl Settings {
    /// Load `.env` (if any) and read settings from the process environment.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unset or blank variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            output_dir: get(OUTPUT_DIR_VAR).map(PathBuf::from).unwrap_or(defaults.output_dir),
            cache_dir: get(CACHE_DIR_VAR).map(PathBuf::from).unwrap_or(defaults.cache_dir),
            log_format: match get(LOG_FORMAT_VAR) {
                Some(v) => v.parse()?,
                None => defaults.log_format,
            },
        })
    }
}
