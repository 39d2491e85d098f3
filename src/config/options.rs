//! Raw provider options and the resolver that merges them
//!
//! Options arrive as loosely typed key/value pairs from the host. They are
//! merged once per provider instance, numeric-looking strings are turned into
//! numbers, and the result is read-only afterwards.

use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Digits with at most one decimal point, e.g. `42`, `0.7`, `.5`, `3.`
static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]+\.?[0-9]*|\.[0-9]+)$").expect("valid numeric pattern"));

/// Strings that coerce to `true`
const TRUTHY: [&str; 5] = ["true", "1", "t", "y", "yes"];

/// A single option value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl OptionValue {
    /// Coerce to a boolean
    ///
    /// Strings are `true` iff, trimmed and lowercased, they are one of
    /// `true`, `1`, `t`, `y`, `yes`. Other values use their truthiness.
    #[must_use]
    pub fn coerce_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => TRUTHY.contains(&s.trim().to_lowercase().as_str()),
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Numeric value, if this is a number
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrowed string, if this is a string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => f.write_str(&items.join("\n")),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Option name to value, in insertion order
pub type Options = IndexMap<String, OptionValue>;

/// Build an [`Options`] map from key/value pairs
pub fn options<K, V, I>(pairs: I) -> Options
where
    K: Into<String>,
    V: Into<OptionValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Merge `overrides` on top of `defaults` and coerce numeric strings
///
/// Every key of `overrides` wins; keys only present in `defaults` are kept.
#[must_use]
pub fn resolve(defaults: &Options, overrides: &Options) -> Options {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }

    for value in merged.values_mut() {
        if let OptionValue::Text(text) = value {
            if let Some(number) = parse_numeric(text) {
                *value = OptionValue::Number(number);
            }
        }
    }

    merged
}

fn parse_numeric(text: &str) -> Option<f64> {
    if NUMERIC.is_match(text) {
        text.parse().ok()
    } else {
        None
    }
}

/// Read the `initial_prompt` option
///
/// A list is joined with newlines. The result is trimmed; empty means absent.
#[must_use]
pub fn initial_prompt(options: &Options) -> Option<String> {
    let prompt = match options.get("initial_prompt")? {
        OptionValue::List(lines) => lines.join("\n"),
        OptionValue::Text(text) => text.clone(),
        other => other.to_string(),
    };
    let prompt = prompt.trim();
    if prompt.is_empty() {
        None
    } else {
        Some(prompt.to_string())
    }
}
