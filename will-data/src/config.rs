//! `will.toml`: storage locations, session store and logging.
//!
//! Every field has a default, so an empty or missing file is valid.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::Deserialize;
use thiserror::Error;
use will_core::SessionStoreConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub documents_dir: PathBuf,
    pub submission_log: PathBuf,
    /// Directory of `*.txt.tera` templates; the built-in will template is
    /// used when unset.
    pub template_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("generated_wills"),
            submission_log: PathBuf::from("will_submissions.csv"),
            template_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub backend: String,
    pub connection_string: String,
    pub ttl_minutes: u32,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        let store = SessionStoreConfig::default();
        Self {
            backend: store.backend,
            connection_string: store.connection_string,
            ttl_minutes: 120,
        }
    }
}

impl SessionsConfig {
    pub fn store(&self) -> SessionStoreConfig {
        SessionStoreConfig {
            backend: self.backend.clone(),
            connection_string: self.connection_string.clone(),
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.ttl_minutes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Bare level or full `EnvFilter` directive. `RUST_LOG` wins when set.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WillConfig {
    pub storage: StorageConfig,
    pub sessions: SessionsConfig,
    pub logging: LoggingConfig,
}

impl WillConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
