//! XDG config store for recording defaults
//!
//! Reads `micrec/config.toml` under the platform config directory. A
//! missing file is not an error; it just means built-in defaults.

use std::fs;
use std::path::PathBuf;

use crate::domain::{ConfigError, RecorderDefaults};

pub struct XdgDefaultsStore {
    path: PathBuf,
}

impl XdgDefaultsStore {
    pub fn new() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join("micrec").join("config.toml"),
        }
    }

    /// Store backed by an explicit file path (used by tests).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<RecorderDefaults, ConfigError> {
        if !self.path.exists() {
            return Ok(RecorderDefaults::default());
        }
        let text =
            fs::read_to_string(&self.path).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl Default for XdgDefaultsStore {
    fn default() -> Self {
        Self::new()
    }
}
