//! Configuration for providers
//!
//! Layers, lowest priority first:
//! 1. Built-in provider defaults
//! 2. Host settings file (`<config_dir>/ai-bridge/config.json`)
//! 3. Options passed by the caller for a single request

pub mod options;
pub mod providers;
pub mod settings;

pub use self::{
    options::{initial_prompt, resolve, OptionValue, Options},
    providers::{GoogleConfig, ProviderKind, ResponsesConfig},
    settings::HostSettings,
};
