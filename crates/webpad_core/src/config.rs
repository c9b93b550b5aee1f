//! Playground configuration.
//!
//! # Responsibility
//! - Hold the storage key, export file name and logging/storage settings.
//! - Layer defaults, an optional JSON file, and `WEBPAD_*` environment values.
//!
//! # Invariants
//! - Storage key and download file name are never empty.
//! - Environment keys map to fields by name (`WEBPAD_LOG_LEVEL` -> `log_level`).

use crate::logging::default_log_level;
use config::{Config, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Storage key the project is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "code-editor-content";
/// File name offered for project downloads.
pub const DEFAULT_DOWNLOAD_FILE_NAME: &str = "your-test-idea.json";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "WEBPAD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaygroundConfig {
    pub storage_key: String,
    pub download_file_name: String,
    pub log_level: String,
    /// Absolute directory for rolling log files; stderr when unset.
    pub log_dir: Option<PathBuf>,
    /// SQLite file backing the key-value store.
    pub db_path: Option<PathBuf>,
    /// Total storage budget in bytes; unlimited when unset.
    pub storage_quota_bytes: Option<usize>,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            download_file_name: DEFAULT_DOWNLOAD_FILE_NAME.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
            db_path: None,
            storage_quota_bytes: None,
        }
    }
}

impl PlaygroundConfig {
    /// Loads defaults, then `file` (if given), then the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(file, None)
    }

    /// Like [`Self::load`], reading overrides from `env` instead of the
    /// process environment when it is given.
    pub fn load_with_env(
        file: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Json));
        }
        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .ignore_empty(true)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage_key",
                value: self.storage_key.clone(),
            });
        }
        if self.download_file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "download_file_name",
                value: self.download_file_name.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    Load(config::ConfigError),
    InvalidValue {
        field: &'static str,
        value: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "failed to load config: {err}"),
            Self::InvalidValue { field, value } => {
                write!(f, "invalid config value for {field}: `{value}`")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(value: config::ConfigError) -> Self {
        Self::Load(value)
    }
}
