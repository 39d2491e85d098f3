//! Shared helpers for provider integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use ai_bridge::{
    config::{OptionValue, Options},
    logging::ProviderLoggers,
    utils::ProviderUtils,
    CommandType, ProviderContext, Result,
};

pub const API_KEY: &str = "test-key";

/// Utilities with a fixed API key that remember debug records
#[derive(Debug, Default)]
pub struct RecordingUtils {
    pub debug: Mutex<Vec<String>>,
}

impl ProviderUtils for RecordingUtils {
    fn print_debug(&self, message: &str) {
        self.debug.lock().unwrap().push(message.to_string());
    }

    fn load_api_key(&self, _env_var: &str, _token_file_path: &str) -> Result<String> {
        Ok(API_KEY.to_string())
    }
}

pub fn context_with(utils: Arc<RecordingUtils>, loggers: ProviderLoggers) -> ProviderContext {
    ProviderContext::new(CommandType::Chat, utils, loggers)
}

pub fn context() -> ProviderContext {
    context_with(Arc::new(RecordingUtils::default()), ProviderLoggers::disabled())
}

pub fn opts(pairs: &[(&str, &str)]) -> Options {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), OptionValue::from(*v)))
        .collect()
}
