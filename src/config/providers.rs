//! Provider kinds and their typed configuration records

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::options::{self, OptionValue, Options};
use crate::error::{BridgeError, Result};

/// Supported provider backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Google,
    OpenaiResponses,
}

impl ProviderKind {
    /// All known kinds, in display order
    pub const ALL: [Self; 2] = [Self::Google, Self::OpenaiResponses];

    /// Name used by the `provider` option
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::OpenaiResponses => "openai_responses",
        }
    }

    /// Built-in defaults used when the host supplies none
    #[must_use]
    pub fn default_options(&self) -> Options {
        match self {
            Self::Google => options::options([
                (
                    "endpoint_url",
                    OptionValue::from("https://generativelanguage.googleapis.com/v1beta/models"),
                ),
                ("model", OptionValue::from("gemini-2.0-flash")),
                ("request_timeout", OptionValue::Number(20.0)),
                ("token_file_path", OptionValue::from("")),
                ("temperature", OptionValue::from("")),
                ("max_output_tokens", OptionValue::from("")),
                ("top_p", OptionValue::from("")),
                ("top_k", OptionValue::from("")),
            ]),
            Self::OpenaiResponses => options::options([
                ("endpoint_url", OptionValue::from("https://api.openai.com/v1")),
                ("model", OptionValue::from("gpt-4.1-mini")),
                ("stream", OptionValue::Bool(true)),
                ("request_timeout", OptionValue::Number(20.0)),
                ("token_file_path", OptionValue::from("")),
                ("initial_prompt", OptionValue::from("")),
            ]),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" | "gemini" => Ok(Self::Google),
            "openai_responses" | "openai-responses" => Ok(Self::OpenaiResponses),
            _ => Err(BridgeError::InvalidConfig(format!("unknown provider: {s}"))),
        }
    }
}

/// Effective configuration of the Google adapter
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleConfig {
    pub endpoint_url: String,
    pub model: String,
    pub token_file_path: String,
    pub request_timeout: Duration,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
}

impl GoogleConfig {
    /// Build from resolved options
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidConfig`] for missing or mistyped keys
    pub fn from_options(options: &Options) -> Result<Self> {
        Ok(Self {
            endpoint_url: required_str(options, "endpoint_url")?
                .trim_end_matches('/')
                .to_string(),
            model: required_str(options, "model")?.to_string(),
            token_file_path: optional_str(options, "token_file_path").unwrap_or_default(),
            request_timeout: timeout(options)?,
            temperature: optional_number(options, "temperature")?,
            max_output_tokens: optional_count(options, "max_output_tokens")?,
            top_p: optional_number(options, "top_p")?,
            top_k: optional_count(options, "top_k")?,
        })
    }
}

/// Effective configuration of the OpenAI Responses adapter
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsesConfig {
    pub endpoint_url: String,
    pub model: String,
    pub stream: bool,
    pub token_file_path: String,
    pub request_timeout: Duration,
    pub initial_prompt: Option<String>,
}

impl ResponsesConfig {
    /// Build from resolved options
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidConfig`] for missing or mistyped keys
    pub fn from_options(options: &Options) -> Result<Self> {
        Ok(Self {
            endpoint_url: required_str(options, "endpoint_url")?
                .trim_end_matches('/')
                .to_string(),
            model: required_str(options, "model")?.to_string(),
            stream: options
                .get("stream")
                .is_some_and(OptionValue::coerce_bool),
            token_file_path: optional_str(options, "token_file_path").unwrap_or_default(),
            request_timeout: timeout(options)?,
            initial_prompt: options::initial_prompt(options),
        })
    }
}

fn required_str<'a>(options: &'a Options, key: &str) -> Result<&'a str> {
    match options.get(key) {
        Some(OptionValue::Text(s)) if !s.trim().is_empty() => Ok(s.as_str()),
        Some(other) => Err(BridgeError::InvalidConfig(format!(
            "option `{key}` must be a non-empty string, got `{other}`"
        ))),
        None => Err(BridgeError::InvalidConfig(format!(
            "missing required option `{key}`"
        ))),
    }
}

fn optional_str(options: &Options, key: &str) -> Option<String> {
    options.get(key).map(ToString::to_string)
}

/// Numbers pass through; absent or empty strings count as unset
fn optional_number(options: &Options, key: &str) -> Result<Option<f64>> {
    match options.get(key) {
        None => Ok(None),
        Some(OptionValue::Number(n)) => Ok(Some(*n)),
        Some(OptionValue::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(other) => Err(BridgeError::InvalidConfig(format!(
            "option `{key}` must be a number, got `{other}`"
        ))),
    }
}

// The cast is range-checked in the match guard
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn optional_count(options: &Options, key: &str) -> Result<Option<u32>> {
    match optional_number(options, key)? {
        None => Ok(None),
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => Ok(Some(n as u32)),
        Some(n) => Err(BridgeError::InvalidConfig(format!(
            "option `{key}` must be a non-negative integer, got `{n}`"
        ))),
    }
}

fn timeout(options: &Options) -> Result<Duration> {
    let seconds = optional_number(options, "request_timeout")?.ok_or_else(|| {
        BridgeError::InvalidConfig("missing required option `request_timeout`".to_string())
    })?;
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        BridgeError::InvalidConfig(format!(
            "option `request_timeout` must be a non-negative number of seconds, got `{seconds}`"
        ))
    })
}
