//! Google Gemini adapter
//!
//! Sends the whole conversation as one `streamGenerateContent` call and reads
//! the SSE answer line by line.

use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use reqwest::{header, Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    config::{resolve, GoogleConfig, Options, ProviderKind},
    error::{BridgeError, Result},
    messages::{ContentItem, Message, ResponseChunk, Role},
};

use super::{
    build_client, ensure_success, transport_error,
    streaming::{SseLine, SseLineDecoder},
    AiProvider, ChunkStream, ProviderContext,
};

const PROVIDER: &str = "google";
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Google Gemini adapter
#[derive(Debug)]
pub struct GoogleProvider {
    client: Client,
    config: GoogleConfig,
    context: ProviderContext,
}

impl GoogleProvider {
    /// Create an adapter on top of the built-in Google defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the resolved options are invalid
    pub fn new(context: ProviderContext, options: &Options) -> Result<Self> {
        Self::with_defaults(context, &ProviderKind::Google.default_options(), options)
    }

    /// Create an adapter from host defaults and caller overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the resolved options are invalid
    pub fn with_defaults(
        context: ProviderContext,
        defaults: &Options,
        options: &Options,
    ) -> Result<Self> {
        let config = GoogleConfig::from_options(&resolve(defaults, options))?;
        let client = build_client(config.request_timeout)?;
        Ok(Self {
            client,
            config,
            context,
        })
    }

    /// Effective configuration
    #[must_use]
    pub const fn config(&self) -> &GoogleConfig {
        &self.config
    }

    /// Streaming endpoint for the configured model, without query
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}:streamGenerateContent",
            self.config.endpoint_url, self.config.model
        )
    }

    /// Build the request body
    ///
    /// The first system message becomes the system instruction; later system
    /// messages are dropped. Assistant turns map to `model`, everything else
    /// to `user`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedContent`] for non-text content
    pub fn build_request(&self, messages: &[Message]) -> Result<GenerateContentRequest> {
        let mut system_instruction = None;
        let mut contents = Vec::new();

        for message in messages {
            if message.role == Role::System {
                let Some(first) = message.content.first() else {
                    continue;
                };
                let text = text_of(first)?;
                if system_instruction.is_some() {
                    tracing::debug!("google: ignoring additional system message");
                    continue;
                }
                system_instruction = Some(SystemInstruction {
                    parts: vec![Part {
                        text: text.to_string(),
                    }],
                });
                continue;
            }

            let role = if message.role == Role::Assistant {
                GoogleRole::Model
            } else {
                GoogleRole::User
            };
            let parts = message
                .content
                .iter()
                .map(|item| {
                    text_of(item).map(|text| Part {
                        text: text.to_string(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            contents.push(Content { role, parts });
        }

        Ok(GenerateContentRequest {
            system_instruction,
            contents,
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
            },
        })
    }

    /// Read the SSE body into chunks
    fn process_stream(
        request: RequestBuilder,
        context: ProviderContext,
    ) -> impl Stream<Item = Result<ResponseChunk>> + Send + 'static {
        async_stream::try_stream! {
            let response = request.send().await.map_err(transport_error)?;
            let response = ensure_success(PROVIDER, response).await?;
            let mut body = response.bytes_stream();
            let mut decoder = SseLineDecoder::new();
            let mut finished = false;

            while !finished {
                let lines = match body.next().await {
                    Some(bytes) => decoder.push(&bytes.map_err(transport_error)?),
                    None => {
                        finished = true;
                        decoder.finish().into_iter().collect()
                    }
                };

                for line in lines {
                    match line {
                        SseLine::Done => {
                            finished = true;
                            break;
                        }
                        SseLine::Data(data) => {
                            context.loggers.vendor.log(&data)?;
                            context.record(PROVIDER, "response", &data)?;
                            let chunk = parse_stream_line(&data)?;
                            yield chunk;
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl AiProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn request(&self, messages: &[Message]) -> Result<ChunkStream> {
        let body = self.build_request(messages)?;
        let api_key = self
            .context
            .utils
            .load_api_key(API_KEY_ENV, &self.config.token_file_path)?;

        let payload = serde_json::to_string(&body)?;
        self.context.record(PROVIDER, "request", &payload)?;
        self.context.loggers.vendor.log(&payload)?;

        let request = self
            .client
            .post(self.endpoint())
            .query(&[("alt", "sse"), ("key", api_key.as_str())])
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload);

        Ok(Box::pin(Self::process_stream(request, self.context.clone())))
    }
}

fn text_of(item: &ContentItem) -> Result<&str> {
    match item {
        ContentItem::Text { text } => Ok(text),
        other => Err(BridgeError::UnsupportedContent {
            provider: PROVIDER.to_string(),
            content_type: other.kind().to_string(),
        }),
    }
}

/// Parse one `data: ` payload into a chunk
///
/// Uses the first part of the first candidate. When the candidate carries a
/// finish reason the text loses its trailing whitespace, since models tend
/// to end the last segment with a blank line.
///
/// # Errors
///
/// Returns an error for malformed JSON or a missing candidate/part
pub fn parse_stream_line(data: &str) -> Result<ResponseChunk> {
    let chunk: StreamChunk = serde_json::from_str(data)?;
    let candidate = chunk
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| BridgeError::protocol(PROVIDER, "response has no candidates"))?;

    let text = candidate
        .content
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| BridgeError::protocol(PROVIDER, "candidate has no text part"))?;

    let text = if candidate.finish_reason.is_some() {
        text.trim_end().to_string()
    } else {
        text
    };
    Ok(ResponseChunk::assistant(text))
}

// Gemini API types

/// Body of a `streamGenerateContent` call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoogleRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub role: GoogleRole,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}
