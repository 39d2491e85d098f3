//! Host services consumed by providers
//!
//! Providers never talk to the host directly; they go through
//! [`ProviderUtils`]. [`EnvUtils`] is the implementation used by the binary.

use std::{fs, path::PathBuf};

use crate::{
    error::{BridgeError, Result},
    logging::LogSink,
};

/// Services a provider needs from its host
pub trait ProviderUtils: Send + Sync {
    /// Emit a debug record
    fn print_debug(&self, message: &str);

    /// Wrap a message into an error the host shows verbatim
    fn make_known_error(&self, message: &str) -> BridgeError {
        BridgeError::Known(message.to_string())
    }

    /// Fetch the API key from `env_var`, falling back to `token_file_path`
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingApiKey`] when neither source has a key
    fn load_api_key(&self, env_var: &str, token_file_path: &str) -> Result<String>;
}

/// Environment and file backed utilities
#[derive(Debug, Clone)]
pub struct EnvUtils {
    debug_sink: LogSink,
}

impl EnvUtils {
    /// Debug records go to `tracing` and to `debug_sink`
    #[must_use]
    pub const fn new(debug_sink: LogSink) -> Self {
        Self { debug_sink }
    }
}

impl Default for EnvUtils {
    fn default() -> Self {
        Self::new(LogSink::Disabled)
    }
}

impl ProviderUtils for EnvUtils {
    fn print_debug(&self, message: &str) {
        tracing::debug!("{message}");
        if let Err(e) = self.debug_sink.log(message) {
            tracing::warn!("failed to write debug record: {e}");
        }
    }

    fn load_api_key(&self, env_var: &str, token_file_path: &str) -> Result<String> {
        if let Ok(key) = std::env::var(env_var) {
            let key = key.trim();
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }

        if !token_file_path.trim().is_empty() {
            let path = expand_home(token_file_path.trim());
            let key = fs::read_to_string(&path).map_err(|e| {
                self.make_known_error(&format!(
                    "Failed to read API key from {}: {e}",
                    path.display()
                ))
            })?;
            let key = key.trim();
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }

        Err(BridgeError::MissingApiKey {
            env_var: env_var.to_string(),
        })
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
