//! OpenAI Responses adapter against a mock `/responses` endpoint

mod common;

use std::{fs, sync::Arc};

use ai_bridge::{
    logging::{LoggingConfig, LoggingSettings, ProviderLoggers},
    services::OpenAiResponsesProvider,
    AiProvider, BridgeError, ChunkKind, Message, ProviderContext, ResponseChunk,
};
use common::{context, context_with, opts, RecordingUtils, API_KEY};
use futures::{StreamExt, TryStreamExt};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn sse_event(event: &Value) -> String {
    format!("event: {}\ndata: {}\n\n", event["type"].as_str().unwrap(), event)
}

fn sse_body(events: &[Value]) -> String {
    events.iter().map(sse_event).collect()
}

fn provider(server: &MockServer, extra: &[(&str, &str)]) -> OpenAiResponsesProvider {
    provider_with(server, context(), extra)
}

fn provider_with(
    server: &MockServer,
    ctx: ProviderContext,
    extra: &[(&str, &str)],
) -> OpenAiResponsesProvider {
    let endpoint = format!("{}/v1", server.uri());
    let mut pairs = vec![("endpoint_url", endpoint.as_str()), ("model", "gpt-test")];
    pairs.extend_from_slice(extra);
    OpenAiResponsesProvider::new(ctx, &opts(&pairs)).unwrap()
}

async fn mount_stream(server: &MockServer, events: &[Value]) {
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .and(body_partial_json(json!({"model": "gpt-test", "stream": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse_body(events), "text/event-stream"),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_stream_emits_text_events_then_stops() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        &[
            json!({"type": "response.created", "response": {"id": "resp_1"}}),
            json!({"type": "response.output_item.added", "item": {"type": "message"}}),
            json!({"type": "response.content_part.added", "part": {"type": "output_text", "text": "A"}}),
            json!({"type": "response.output_text.delta", "delta": "B"}),
            json!({"type": "response.output_text.done", "text": "AB"}),
            json!({"type": "response.completed", "response": {"id": "resp_1"}}),
            json!({"type": "response.output_text.delta", "delta": "after completion"}),
        ],
    )
    .await;

    let chunks: Vec<ResponseChunk> = provider(&server, &[])
        .request(&[Message::user("Hi")])
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(
        chunks,
        vec![ResponseChunk::assistant("A"), ResponseChunk::assistant("B")]
    );
}

#[tokio::test]
async fn test_error_event_after_chunks() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        &[
            json!({"type": "response.output_text.delta", "delta": "partial"}),
            json!({"type": "error", "code": "429", "message": "rate limited", "param": null}),
            json!({"type": "response.output_text.delta", "delta": "never"}),
        ],
    )
    .await;

    let mut stream = provider(&server, &[])
        .request(&[Message::user("Hi")])
        .unwrap();

    assert_eq!(
        stream.next().await.unwrap().unwrap(),
        ResponseChunk::assistant("partial")
    );
    let err = stream.next().await.unwrap().unwrap_err();
    assert!(matches!(err, BridgeError::Vendor { .. }));
    assert!(err.to_string().contains("429"));
    assert!(err.to_string().contains("rate limited"));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_single_shot_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(body_partial_json(json!({"stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp_1",
            "object": "response",
            "output": [{
                "type": "message",
                "role": "assistant",
                "content": [{"type": "output_text", "text": "Hello there"}]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let chunks: Vec<ResponseChunk> = provider(&server, &[("stream", "0")])
        .request(&[Message::user("Hi")])
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].kind, ChunkKind::Assistant);
    assert_eq!(chunks[0].content, "Hello there");
}

#[tokio::test]
async fn test_initial_prompt_is_sent_first() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        &[json!({"type": "response.completed", "response": {}})],
    )
    .await;

    let chunks: Vec<ResponseChunk> = provider(&server, &[("initial_prompt", "Be terse.")])
        .request(&[Message::user("Hi")])
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert!(chunks.is_empty());

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(
        body["input"],
        json!([
            {"content": "Be terse.", "role": "user", "type": "message"},
            {"content": "Hi", "role": "user", "type": "message"}
        ])
    );
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = provider(&server, &[])
        .request(&[Message::user("Hi")])
        .unwrap()
        .try_collect::<Vec<_>>()
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::Api { status: 401, .. }));
}

#[tokio::test]
async fn test_requests_and_events_are_logged() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        &[
            json!({"type": "response.output_text.delta", "delta": "logged"}),
            json!({"type": "response.completed", "response": {}}),
        ],
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let plugin_path = temp_dir.path().join("plugin.log");
    let vendor_path = temp_dir.path().join("vendor").join("vendor.log");
    let loggers = ProviderLoggers::new(&LoggingSettings {
        plugin: LoggingConfig {
            enabled: true,
            file_path: Some(plugin_path.clone()),
        },
        vendor: LoggingConfig {
            enabled: true,
            file_path: Some(vendor_path.clone()),
        },
    });
    let utils = Arc::new(RecordingUtils::default());

    let chunks: Vec<ResponseChunk> = provider_with(&server, context_with(utils.clone(), loggers), &[])
        .request(&[Message::user("Hi")])
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(chunks, vec![ResponseChunk::assistant("logged")]);

    let plugin = fs::read_to_string(&plugin_path).unwrap();
    let plugin_lines: Vec<&str> = plugin.lines().collect();
    assert_eq!(plugin_lines.len(), 3);
    assert!(plugin_lines[0].contains("openai_responses: [chat] request: "));
    assert!(plugin_lines[1].contains("openai_responses: [chat] response: "));
    assert!(plugin_lines[2].contains("openai_responses: [chat] response: "));

    let vendor = fs::read_to_string(&vendor_path).unwrap();
    let vendor_lines: Vec<&str> = vendor.lines().collect();
    assert_eq!(vendor_lines.len(), 3);
    assert!(vendor_lines[0].contains(r#""model":"gpt-test""#));
    assert!(vendor_lines[1].contains("response.output_text.delta"));
    assert!(vendor_lines[2].contains("response.completed"));

    assert_eq!(utils.debug.lock().unwrap().len(), 3);
}
