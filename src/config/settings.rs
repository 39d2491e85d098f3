//! Host settings file
//!
//! The host driver keeps per-provider default options and the logging
//! switches in a single JSON file. Adapters never read it themselves; the
//! host loads it and injects the values.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::{Options, ProviderKind};
use crate::error::{BridgeError, Result};
use crate::logging::LoggingSettings;

/// Settings stored in `<config_dir>/ai-bridge/config.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostSettings {
    /// Provider used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,

    /// Default options for the Google adapter
    #[serde(default)]
    pub google: Options,

    /// Default options for the OpenAI Responses adapter
    #[serde(default)]
    pub openai_responses: Options,

    /// Diagnostic sinks
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl HostSettings {
    /// Get the settings file path
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ai-bridge")
            .join("config.json")
    }

    /// Load settings from the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load settings from a specific path
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| BridgeError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&contents).map_err(|e| BridgeError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save settings to a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Defaults for a provider: built-ins overlaid with the file's entries
    #[must_use]
    pub fn defaults_for(&self, kind: ProviderKind) -> Options {
        let configured = match kind {
            ProviderKind::Google => &self.google,
            ProviderKind::OpenaiResponses => &self.openai_responses,
        };
        let mut defaults = kind.default_options();
        defaults.extend(configured.iter().map(|(k, v)| (k.clone(), v.clone())));
        defaults
    }
}
