//! OpenAI Responses API adapter
//!
//! Supports:
//! - Single-shot `POST /responses` returning one response object
//! - Streaming `POST /responses` with `stream: true`, delivered as SSE events
//!   that are dispatched on their `type`

use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    config::{resolve, Options, ProviderKind, ResponsesConfig},
    error::{BridgeError, Result},
    messages::{ContentItem, Message, ResponseChunk, Role},
};

use super::{
    build_client, ensure_success, streaming::SseParser, transport_error, AiProvider, ChunkStream,
    ProviderContext,
};

const PROVIDER: &str = "openai_responses";
const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAI Responses adapter
#[derive(Debug)]
pub struct OpenAiResponsesProvider {
    client: Client,
    config: ResponsesConfig,
    context: ProviderContext,
}

impl OpenAiResponsesProvider {
    /// Create an adapter on top of the built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the resolved options are invalid
    pub fn new(context: ProviderContext, options: &Options) -> Result<Self> {
        Self::with_defaults(
            context,
            &ProviderKind::OpenaiResponses.default_options(),
            options,
        )
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
        let config = ResponsesConfig::from_options(&resolve(defaults, options))?;
        let client = build_client(config.request_timeout)?;
        Ok(Self {
            client,
            config,
            context,
        })
    }

    /// Effective configuration
    #[must_use]
    pub const fn config(&self) -> &ResponsesConfig {
        &self.config
    }

    /// Build the `input` list sent to the API
    ///
    /// The initial prompt is prepended as a user message unless some message
    /// already has exactly that (trimmed) content.
    #[must_use]
    pub fn build_input(&self, messages: &[Message]) -> Vec<InputItem> {
        let mut input: Vec<InputItem> = messages.iter().map(InputItem::from).collect();

        if let Some(prompt) = &self.config.initial_prompt {
            let present = input.iter().any(|item| item.content.trim() == prompt.as_str());
            if !present {
                input.insert(0, InputItem::message(Role::User, prompt.clone()));
            }
        }

        input
    }

    /// Read one response object into a single chunk
    fn process_response(
        request: RequestBuilder,
        context: ProviderContext,
    ) -> impl Stream<Item = Result<ResponseChunk>> + Send + 'static {
        async_stream::try_stream! {
            let response = request.send().await.map_err(transport_error)?;
            let response = ensure_success(PROVIDER, response).await?;
            let body = response.text().await.map_err(transport_error)?;
            context.loggers.vendor.log(&body)?;

            let value: serde_json::Value = serde_json::from_str(&body)?;
            context.record(PROVIDER, "response", &value)?;
            let chunk = parse_response(value)?;
            yield chunk;
        }
    }

    /// Read the SSE event stream into chunks
    fn process_stream(
        request: RequestBuilder,
        context: ProviderContext,
    ) -> impl Stream<Item = Result<ResponseChunk>> + Send + 'static {
        async_stream::try_stream! {
            let response = request.send().await.map_err(transport_error)?;
            let response = ensure_success(PROVIDER, response).await?;
            let mut body = response.bytes_stream();
            let mut parser = SseParser::new();
            let mut finished = false;

            while !finished {
                let events = match body.next().await {
                    Some(bytes) => parser.parse_chunk(&bytes.map_err(transport_error)?),
                    None => {
                        finished = true;
                        parser.flush().into_iter().collect()
                    }
                };

                for event in events {
                    if event.is_done_marker() {
                        finished = true;
                        break;
                    }
                    context.loggers.vendor.log(&event.data)?;
                    context.record(PROVIDER, "response", &event.data)?;

                    let parsed: StreamEvent = serde_json::from_str(&event.data)?;
                    match dispatch_event(parsed)? {
                        StreamStep::Emit(chunk) => {
                            yield chunk;
                        }
                        StreamStep::Stop => {
                            finished = true;
                            break;
                        }
                        StreamStep::Skip => {}
                    }
                }
            }
        }
    }
}

#[async_trait]
impl AiProvider for OpenAiResponsesProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn request(&self, messages: &[Message]) -> Result<ChunkStream> {
        let input = self.build_input(messages);
        let api_key = self
            .context
            .utils
            .load_api_key(API_KEY_ENV, &self.config.token_file_path)?;

        let body = CreateResponseRequest {
            input: &input,
            model: &self.config.model,
            stream: self.config.stream,
        };
        let payload = serde_json::to_string(&body)?;
        self.context.record(PROVIDER, "request", &payload)?;
        self.context.loggers.vendor.log(&payload)?;

        let request = self
            .client
            .post(format!("{}/responses", self.config.endpoint_url))
            .bearer_auth(api_key)
            .json(&body);

        let context = self.context.clone();
        if self.config.stream {
            Ok(Box::pin(Self::process_stream(request, context)))
        } else {
            Ok(Box::pin(Self::process_response(request, context)))
        }
    }
}

/// What to do after one stream event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStep {
    Emit(ResponseChunk),
    Stop,
    Skip,
}

/// Map a stream event to its effect on the chunk sequence
///
/// # Errors
///
/// Returns [`BridgeError::Vendor`] for an `error` event
pub fn dispatch_event(event: StreamEvent) -> Result<StreamStep> {
    match event {
        StreamEvent::ContentPartAdded { part } => Ok(StreamStep::Emit(ResponseChunk::assistant(
            part.text,
        ))),
        StreamEvent::OutputTextDelta { delta } => {
            Ok(StreamStep::Emit(ResponseChunk::assistant(delta)))
        }
        StreamEvent::Completed => Ok(StreamStep::Stop),
        StreamEvent::Error { code, message } => Err(BridgeError::Vendor {
            code: render_code(code.as_ref()),
            message,
        }),
        StreamEvent::Other => Ok(StreamStep::Skip),
    }
}

fn render_code(code: Option<&serde_json::Value>) -> String {
    match code {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Turn a non-streaming response object into one chunk
///
/// Role `assistant` passes through; any other role becomes `thinking`.
///
/// # Errors
///
/// Returns [`BridgeError::Protocol`] when the first output item has no text
pub fn parse_response(value: serde_json::Value) -> Result<ResponseChunk> {
    let response: ResponseObject = serde_json::from_value(value)?;
    let item = response
        .output
        .into_iter()
        .next()
        .ok_or_else(|| BridgeError::protocol(PROVIDER, "response has no output"))?;

    let text = item
        .content
        .into_iter()
        .next()
        .and_then(|part| part.text)
        .ok_or_else(|| BridgeError::protocol(PROVIDER, "output item has no text"))?;

    if item.role.as_deref() == Some("assistant") {
        Ok(ResponseChunk::assistant(text))
    } else {
        Ok(ResponseChunk::thinking(text))
    }
}

// Responses API types

/// One entry of the `input` list
///
/// Only a single content item per message is representable: the first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputItem {
    pub content: String,
    pub role: Role,
    #[serde(rename = "type")]
    pub item_type: InputItemType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputItemType {
    Message,
}

impl InputItem {
    #[must_use]
    pub fn message(role: Role, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role,
            item_type: InputItemType::Message,
        }
    }
}

impl From<&Message> for InputItem {
    fn from(message: &Message) -> Self {
        let content = match message.content.first() {
            None => String::new(),
            Some(ContentItem::Text { text }) => text.clone(),
            Some(ContentItem::ImageUrl { image_url }) => image_url.url.clone(),
        };
        Self::message(message.role, content)
    }
}

#[derive(Debug, Serialize)]
struct CreateResponseRequest<'a> {
    input: &'a [InputItem],
    model: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ResponseObject {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    role: Option<String>,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    text: Option<String>,
}

/// Streaming event, keyed by its `type`
///
/// Types without an effect on the output land in [`StreamEvent::Other`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    #[serde(rename = "response.content_part.added")]
    ContentPartAdded { part: ContentPart },

    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta { delta: String },

    #[serde(rename = "response.completed")]
    Completed,

    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        code: Option<serde_json::Value>,
        #[serde(default)]
        message: String,
    },

    #[serde(other)]
    Other,
}

/// Content part announced by `response.content_part.added`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentPart {
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::options::options,
        logging::ProviderLoggers,
        messages::{ChunkKind, CommandType},
        utils::EnvUtils,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn provider(overrides: &Options) -> OpenAiResponsesProvider {
        let context = ProviderContext::new(
            CommandType::Chat,
            Arc::new(EnvUtils::default()),
            ProviderLoggers::disabled(),
        );
        OpenAiResponsesProvider::new(context, overrides).unwrap()
    }

    fn event(value: serde_json::Value) -> StreamEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_message_mapping() {
        let messages = vec![
            Message {
                role: Role::Developer,
                content: vec![],
            },
            Message::user("hi"),
            Message {
                role: Role::User,
                content: vec![
                    ContentItem::image_url("https://example.com/a.png"),
                    ContentItem::text("ignored"),
                ],
            },
        ];

        let input = provider(&Options::new()).build_input(&messages);
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!([
                {"content": "", "role": "developer", "type": "message"},
                {"content": "hi", "role": "user", "type": "message"},
                {"content": "https://example.com/a.png", "role": "user", "type": "message"}
            ])
        );
    }

    #[test]
    fn test_initial_prompt_is_prepended() {
        let provider = provider(&options([("initial_prompt", "Be terse.")]));
        let messages = vec![Message::system("Something else"), Message::user("hi")];

        let input = provider.build_input(&messages);

        assert_eq!(input.len(), messages.len() + 1);
        assert_eq!(input[0], InputItem::message(Role::User, "Be terse."));
    }

    #[test]
    fn test_initial_prompt_not_duplicated() {
        let provider = provider(&options([("initial_prompt", "Be terse.")]));
        let messages = vec![Message::user("hi"), Message::system("  Be terse.\n")];

        let input = provider.build_input(&messages);

        assert_eq!(input.len(), messages.len());
        assert_eq!(input[0].content, "hi");
    }

    #[test]
    fn test_no_initial_prompt_keeps_input() {
        let input = provider(&Options::new()).build_input(&[Message::user("hi")]);
        assert_eq!(input, vec![InputItem::message(Role::User, "hi")]);
    }

    #[test]
    fn test_dispatch_text_events() {
        let added = event(json!({
            "type": "response.content_part.added",
            "item_id": "msg_1",
            "part": {"type": "output_text", "text": "A", "annotations": []}
        }));
        assert_eq!(
            dispatch_event(added).unwrap(),
            StreamStep::Emit(ResponseChunk::assistant("A"))
        );

        let delta = event(json!({"type": "response.output_text.delta", "delta": "B"}));
        assert_eq!(
            dispatch_event(delta).unwrap(),
            StreamStep::Emit(ResponseChunk::assistant("B"))
        );
    }

    #[test]
    fn test_dispatch_completed_stops() {
        let completed = event(json!({"type": "response.completed", "response": {"id": "r"}}));
        assert_eq!(dispatch_event(completed).unwrap(), StreamStep::Stop);
    }

    #[test]
    fn test_dispatch_unknown_event_is_skipped() {
        for kind in [
            "response.created",
            "response.output_text.done",
            "response.reasoning_summary_text.delta",
            "response.some_future_event",
        ] {
            let unknown = event(json!({"type": kind, "sequence_number": 3}));
            assert_eq!(dispatch_event(unknown).unwrap(), StreamStep::Skip);
        }
    }

    #[test]
    fn test_dispatch_error_event() {
        let error = event(json!({"type": "error", "code": "429", "message": "rate limited"}));
        let err = dispatch_event(error).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("rate limited"));
    }

    #[test]
    fn test_render_code() {
        assert_eq!(render_code(Some(&json!(429))), "429");
        assert_eq!(render_code(Some(&json!(null))), "unknown");
        assert_eq!(render_code(None), "unknown");
    }

    #[test]
    fn test_parse_response_roles() {
        let assistant = parse_response(json!({
            "output": [{"type": "message", "role": "assistant",
                        "content": [{"type": "output_text", "text": "Hello"}]}]
        }))
        .unwrap();
        assert_eq!(assistant, ResponseChunk::assistant("Hello"));

        let other = parse_response(json!({
            "output": [{"type": "message", "role": "system",
                        "content": [{"type": "output_text", "text": "hmm"}]}]
        }))
        .unwrap();
        assert_eq!(other.kind, ChunkKind::Thinking);
    }

    #[test]
    fn test_parse_response_without_output() {
        let err = parse_response(json!({"output": []})).unwrap_err();
        assert!(matches!(err, BridgeError::Protocol { .. }));
    }

    #[test]
    fn test_stream_option() {
        assert!(provider(&Options::new()).config().stream);
        assert!(!provider(&options([("stream", "false")])).config().stream);
    }
}
