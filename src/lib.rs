//! ai-bridge: one conversation model, many LLM backends
//!
//! This library turns a list of role-tagged messages into vendor request
//! payloads, performs the call, and normalizes each vendor's streaming
//! protocol into a uniform sequence of response chunks.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::too_many_lines)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod messages;
pub mod services;
pub mod utils;

// Re-exports for convenience
pub use error::{BridgeError, Result};
pub use messages::{ChunkKind, CommandType, ContentItem, Message, ResponseChunk, Role};
pub use services::{create_provider, AiProvider, ChunkStream, ProviderContext};
