//! Diagnostic log sinks
//!
//! Every provider owns two sinks: `plugin` for high-level request/response
//! records and `vendor` for the raw wire traffic. A sink is either a no-op or
//! an append-only file with one timestamped line per record.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Switch and target for one sink
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
}

/// Configuration of both sinks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub plugin: LoggingConfig,
    #[serde(default)]
    pub vendor: LoggingConfig,
}

/// A single log destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Disabled,
    File(PathBuf),
}

impl LogSink {
    /// Build a sink from its configuration
    ///
    /// Enabled without a path degrades to [`LogSink::Disabled`].
    #[must_use]
    pub fn from_config(config: &LoggingConfig) -> Self {
        match (config.enabled, &config.file_path) {
            (true, Some(path)) if !path.as_os_str().is_empty() => Self::File(path.clone()),
            (true, _) => {
                tracing::warn!("logging enabled without a file path, records are dropped");
                Self::Disabled
            }
            (false, _) => Self::Disabled,
        }
    }

    /// Whether records are written anywhere
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Append one record
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be created or written
    pub fn log(&self, message: &str) -> Result<()> {
        match self {
            Self::Disabled => Ok(()),
            Self::File(path) => append_record(path, message),
        }
    }
}

fn append_record(path: &Path, message: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(file, "[{timestamp}] {message}")?;
    Ok(())
}

/// The two sinks a provider writes to
#[derive(Debug, Clone)]
pub struct ProviderLoggers {
    pub plugin: LogSink,
    pub vendor: LogSink,
}

impl ProviderLoggers {
    #[must_use]
    pub fn new(settings: &LoggingSettings) -> Self {
        Self {
            plugin: LogSink::from_config(&settings.plugin),
            vendor: LogSink::from_config(&settings.vendor),
        }
    }

    /// Loggers that never write
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            plugin: LogSink::Disabled,
            vendor: LogSink::Disabled,
        }
    }
}

impl Default for ProviderLoggers {
    fn default() -> Self {
        Self::disabled()
    }
}
