use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

pub const DEFAULT_BASE_PATH: &str = "/crm";
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Host-tunable settings for the synchronization core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Path prefix under which the console's list routes are mounted.
    pub base_path: String,
    /// Quiet window after the last form edit before filters are applied.
    pub debounce_ms: u64,
    /// Location of the persisted preference document. `None` keeps
    /// preferences in memory only.
    pub preferences_file: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            preferences_file: None,
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::ZeroDebounce);
        }
        Ok(self)
    }
}
