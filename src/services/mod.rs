//! Provider adapters
//!
//! This module adapts the unified conversation model to vendor APIs:
//! - Google Gemini (`streamGenerateContent`, SSE lines)
//! - OpenAI Responses (`/responses`, single-shot or SSE events)

pub mod google;
pub mod openai_responses;
pub mod streaming;

use std::{fmt::Display, pin::Pin, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::Stream;
use reqwest::{Client, Response};

use crate::{
    config::{Options, ProviderKind},
    error::{BridgeError, Result},
    logging::ProviderLoggers,
    messages::{CommandType, ImageResponseChunk, Message, ResponseChunk},
    utils::ProviderUtils,
};

pub use google::GoogleProvider;
pub use openai_responses::OpenAiResponsesProvider;

/// Lazily evaluated stream of response chunks
///
/// Nothing is sent until the stream is first polled. Dropping the stream
/// closes the underlying connection.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ResponseChunk>> + Send>>;

/// `User-Agent` sent by every adapter
pub const USER_AGENT: &str = concat!("ai-bridge/", env!("CARGO_PKG_VERSION"));

/// Core trait for provider adapters
///
/// Each adapter owns its resolved configuration and log sinks; the message
/// list passed to [`AiProvider::request`] is only borrowed while the vendor
/// payload is built.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Get the provider name (e.g., "google")
    fn name(&self) -> &'static str;

    /// Build the vendor payload and return the response stream
    ///
    /// # Errors
    ///
    /// Fails immediately when the messages cannot be represented or the API
    /// key is unavailable. Transport and protocol failures surface as items
    /// of the returned stream.
    fn request(&self, messages: &[Message]) -> Result<ChunkStream>;

    /// Generate images from a prompt
    async fn request_image(&self, _prompt: &str) -> Result<Vec<ImageResponseChunk>> {
        Err(BridgeError::NotImplemented(format!(
            "{} provider: image requests",
            self.name()
        )))
    }
}

/// What every adapter receives from its host
#[derive(Clone)]
pub struct ProviderContext {
    pub command_type: CommandType,
    pub utils: Arc<dyn ProviderUtils>,
    pub loggers: ProviderLoggers,
}

impl ProviderContext {
    #[must_use]
    pub fn new(
        command_type: CommandType,
        utils: Arc<dyn ProviderUtils>,
        loggers: ProviderLoggers,
    ) -> Self {
        Self {
            command_type,
            utils,
            loggers,
        }
    }

    /// Mirror a request or response to the debug channel and the plugin sink
    pub(crate) fn record(&self, provider: &str, direction: &str, payload: &dyn Display) -> Result<()> {
        let message = format!("{provider}: [{}] {direction}: {payload}", self.command_type);
        self.utils.print_debug(&message);
        self.loggers.plugin.log(&message)
    }
}

impl std::fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderContext")
            .field("command_type", &self.command_type)
            .field("loggers", &self.loggers)
            .finish_non_exhaustive()
    }
}

/// Create an adapter for `kind`
///
/// `defaults` are overlaid by `options` (see [`crate::config::resolve`]).
///
/// # Errors
///
/// Returns an error if the resolved options are invalid for the provider
pub fn create_provider(
    kind: ProviderKind,
    context: ProviderContext,
    defaults: &Options,
    options: &Options,
) -> Result<Box<dyn AiProvider>> {
    match kind {
        ProviderKind::Google => Ok(Box::new(GoogleProvider::with_defaults(
            context, defaults, options,
        )?)),
        ProviderKind::OpenaiResponses => Ok(Box::new(OpenAiResponsesProvider::with_defaults(
            context, defaults, options,
        )?)),
    }
}

/// HTTP client with per-operation timeouts
///
/// The timeout bounds connecting and each read, not the whole stream.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()?)
}

/// Transport error with the request URL removed
///
/// The Google endpoint carries the API key in its query string.
pub(crate) fn transport_error(error: reqwest::Error) -> BridgeError {
    BridgeError::Http(error.without_url())
}

/// Turn a non-success status into [`BridgeError::Api`]
pub(crate) async fn ensure_success(provider: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.map_err(transport_error)?;
    tracing::warn!(provider, status = status.as_u16(), "request rejected");
    Err(BridgeError::Api {
        provider: provider.to_string(),
        status: status.as_u16(),
        body,
    })
}
