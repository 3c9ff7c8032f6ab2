use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::Config;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// JSON settings file on disk
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/LaTeXOCR/config.json`, or the working directory when
    /// the platform has no config dir.
    pub fn default_location() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("LaTeXOCR").join("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file. A missing, unreadable or malformed file
    /// yields the defaults; the error is only logged.
    pub fn load(&self) -> Config {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("No settings file at {}, using defaults", self.path.display());
                return Config::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                return Config::default();
            }
        };

        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(map) => Config::merge(Config::default(), &map),
            Err(e) => {
                tracing::warn!("Malformed settings file {}: {}", self.path.display(), e);
                Config::default()
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let body = serde_json::to_string_pretty(config)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        fs::write(&self.path, body).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
