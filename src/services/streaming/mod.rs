//! Streaming support for provider responses
//!
//! Provides the Server-Sent Events (SSE) framing used by the Google and
//! OpenAI Responses streams.

pub mod sse_parser;

pub use sse_parser::{SseEvent, SseLine, SseLineDecoder, SseParser, DATA_PREFIX, DONE_MARKER};
