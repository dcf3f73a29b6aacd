//! Application configuration, read from a TOML file.
//!
//! ```toml
//! namespace = "bikerSOS"
//! storage_dir = "/var/lib/sos"
//! send_delay_ms = 2000
//! success_reset_ms = 5000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

pub const CONFIG_FILENAME: &str = "sos.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Storage namespace. In the browser it prefixes every key
    /// (`bikerSOS_message`); natively it names the settings directory.
    pub namespace: String,
    /// Overrides the platform config directory on native targets.
    pub storage_dir: Option<PathBuf>,
    /// Delay of the simulated delivery transport, and the least time a send
    /// stays in progress.
    pub send_delay_ms: u64,
    /// How long the dashboard shows "sent" before returning to ready.
    pub success_reset_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace: "bikerSOS".to_string(),
            storage_dir: None,
            send_delay_ms: 2000,
            success_reset_ms: 5000,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Reads `path`, or returns the defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents, &path.display().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }

    pub fn success_reset(&self) -> Duration {
        Duration::from_millis(self.success_reset_ms)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AppConfig {
    /// Platform config directory for `qualifier`, e.g. `"com.example.BikerSos"`.
    pub fn project_config_dir(qualifier: &str) -> Result<PathBuf, ConfigError> {
        directories::ProjectDirs::from(qualifier, "", "")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::NoProjectDirs(qualifier.to_string()))
    }

    pub fn default_path(qualifier: &str) -> Result<PathBuf, ConfigError> {
        Ok(Self::project_config_dir(qualifier)?.join(CONFIG_FILENAME))
    }

    /// Directory holding the settings files: `storage_dir` when set, else
    /// `<config dir>/<namespace>`.
    pub fn settings_dir(&self, qualifier: &str) -> Result<PathBuf, ConfigError> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_config_dir(qualifier)?.join(&self.namespace)),
        }
    }
}
