use std::collections::HashMap;
use std::time::Duration;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use guardgate::config::ResolvedProviderConfig;
use guardgate::errors::{GatewayError, UpstreamErrorKind};
use guardgate::llm::{create_adapter, CompletionRequest, FragmentSink, ProviderId, StreamChunk};
use serde_json::{json, Value};
use tokio::sync::mpsc;

async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn resolved(provider: ProviderId, base_url: &str, model: &str) -> ResolvedProviderConfig {
    ResolvedProviderConfig {
        provider,
        available: true,
        api_key: "test-key-123456".into(),
        base_url: base_url.into(),
        model: model.into(),
        timeout: Duration::from_secs(5),
    }
}

fn event_stream(body: &'static str) -> impl IntoResponse {
    ([("content-type", "text/event-stream")], body)
}

async fn stream_all(provider: ProviderId, base_url: &str, prompt: &str) -> (Result<(), GatewayError>, Vec<String>) {
    let adapter = create_adapter(&resolved(provider, base_url, "m")).unwrap();
    let request = CompletionRequest::new(provider, prompt).unwrap();
    let (tx, mut rx) = mpsc::channel(16);
    let sink = FragmentSink::new(tx);
    let outcome = adapter.generate_streaming_completion(&request, &sink).await;
    drop(sink);

    let mut fragments = Vec::new();
    while let Some(chunk) = rx.recv().await {
        if let StreamChunk::Content(text) = chunk {
            fragments.push(text);
        }
    }
    (outcome, fragments)
}

#[tokio::test]
async fn test_openai_completion_round_trip() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(headers["authorization"], "Bearer test-key-123456");
            assert_eq!(body["model"], "gpt-4o-mini");
            assert_eq!(body["messages"][0]["content"], "Say hi");
            Json(json!({
                "model": "gpt-4o-mini-2024-07-18",
                "choices": [{"message": {"role": "assistant", "content": "Hi!"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 3, "completion_tokens": 1}
            }))
        }),
    );
    let base = spawn_upstream(app).await;
    let adapter = create_adapter(&resolved(ProviderId::OpenAI, &format!("{base}/v1"), "gpt-4o-mini")).unwrap();

    let result = adapter
        .generate_completion(&CompletionRequest::new(ProviderId::OpenAI, "Say hi").unwrap())
        .await
        .unwrap();

    assert_eq!(result.content, "Hi!");
    assert_eq!(result.finish_reason, "stop");
    assert_eq!(result.provider, ProviderId::OpenAI);
    assert_eq!(result.usage.unwrap().total_tokens, Some(4));
}

#[tokio::test]
async fn test_openai_rejection_keeps_status_and_message() {
    let app = Router::new().route(
        "/chat/completions",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}})),
            )
        }),
    );
    let base = spawn_upstream(app).await;
    let adapter = create_adapter(&resolved(ProviderId::OpenAI, &base, "gpt-4o-mini")).unwrap();

    let err = adapter
        .generate_completion(&CompletionRequest::new(ProviderId::OpenAI, "Hi").unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.upstream_kind(), Some(UpstreamErrorKind::UpstreamRejected));
    match err {
        GatewayError::UpstreamRejected { status, message, .. } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_openai_malformed_body_is_protocol_error() {
    let app = Router::new().route("/chat/completions", post(|| async { "this is not json" }));
    let base = spawn_upstream(app).await;
    let adapter = create_adapter(&resolved(ProviderId::OpenAI, &base, "m")).unwrap();

    let err = adapter
        .generate_completion(&CompletionRequest::new(ProviderId::OpenAI, "Hi").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.upstream_kind(), Some(UpstreamErrorKind::Protocol));
}

#[tokio::test]
async fn test_unreachable_upstream_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let adapter = create_adapter(&resolved(ProviderId::Groq, &format!("http://{addr}"), "m")).unwrap();
    let err = adapter
        .generate_completion(&CompletionRequest::new(ProviderId::Groq, "Hi").unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.upstream_kind(), Some(UpstreamErrorKind::Network));
    assert!(err.classify().retryable);
}

#[tokio::test]
async fn test_openai_stream_fragments() {
    let app = Router::new().route(
        "/chat/completions",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["stream"], true);
            event_stream(concat!(
                "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
                "data: [DONE]\n\n",
            ))
        }),
    );
    let base = spawn_upstream(app).await;

    let (outcome, fragments) = stream_all(ProviderId::OpenAI, &base, "Hi").await;
    outcome.unwrap();
    assert_eq!(fragments, vec!["Hel", "lo"]);
}

#[tokio::test]
async fn test_groq_truncates_stop_sequences() {
    let app = Router::new().route(
        "/chat/completions",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["stop"].as_array().map(Vec::len), Some(4));
            Json(json!({
                "choices": [{"message": {"content": "ok"}, "finish_reason": "STOP"}]
            }))
        }),
    );
    let base = spawn_upstream(app).await;
    let adapter = create_adapter(&resolved(ProviderId::Groq, &base, "llama-3.3-70b-versatile")).unwrap();

    let request = CompletionRequest::new(ProviderId::Groq, "Hi").unwrap().with_parameters(
        guardgate::llm::GenerationParameters {
            stop_sequences: (0..6).map(|i| format!("s{i}")).collect(),
            ..Default::default()
        },
    );
    let result = adapter.generate_completion(&request).await.unwrap();

    assert_eq!(result.content, "ok");
    assert_eq!(result.finish_reason, "stop");
    assert_eq!(result.model, "llama-3.3-70b-versatile");
}

#[tokio::test]
async fn test_anthropic_completion_and_headers() {
    let app = Router::new().route(
        "/v1/messages",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(headers["x-api-key"], "test-key-123456");
            assert_eq!(headers["anthropic-version"], "2023-06-01");
            assert_eq!(body["max_tokens"], 1024);
            Json(json!({
                "model": "claude-sonnet-4-5-20250929",
                "content": [{"type": "text", "text": "Bonjour"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 8, "output_tokens": 2}
            }))
        }),
    );
    let base = spawn_upstream(app).await;
    let adapter = create_adapter(&resolved(ProviderId::Anthropic, &base, "claude-sonnet-4-5-20250929")).unwrap();

    let result = adapter
        .generate_completion(&CompletionRequest::new(ProviderId::Anthropic, "Say hello in French").unwrap())
        .await
        .unwrap();

    assert_eq!(result.content, "Bonjour");
    assert_eq!(result.finish_reason, "end_turn");
}

#[tokio::test]
async fn test_anthropic_stream_with_in_band_error() {
    let app = Router::new().route(
        "/v1/messages",
        post(|| async {
            event_stream(concat!(
                "event: message_start\ndata: {\"type\":\"message_start\"}\n\n",
                "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Par\"}}\n\n",
                "event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n",
            ))
        }),
    );
    let base = spawn_upstream(app).await;

    let (outcome, fragments) = stream_all(ProviderId::Anthropic, &base, "Hi").await;
    assert_eq!(fragments, vec!["Par"]);
    match outcome.unwrap_err() {
        GatewayError::UpstreamRejected { status, message, .. } => {
            assert_eq!(status, 529);
            assert_eq!(message, "Overloaded");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_gemini_key_in_query_and_single_chunk_stream() {
    let app = Router::new().fallback(
        |uri: Uri, Query(query): Query<HashMap<String, String>>| async move {
            assert_eq!(uri.path(), "/models/gemini-2.5-flash:generateContent");
            assert_eq!(query.get("key").map(String::as_str), Some("test-key-123456"));
            Json(json!({
                "candidates": [{"content": {"parts": [{"text": "All "}, {"text": "at once"}]}, "finishReason": "STOP"}]
            }))
        },
    );
    let base = spawn_upstream(app).await;
    let adapter = create_adapter(&resolved(ProviderId::Google, &base, "gemini-2.5-flash")).unwrap();
    let request = CompletionRequest::new(ProviderId::Google, "Hi").unwrap();

    let (tx, mut rx) = mpsc::channel(4);
    adapter.generate_streaming_completion(&request, &FragmentSink::new(tx)).await.unwrap();

    assert_eq!(rx.recv().await, Some(StreamChunk::Content("All at once".into())));
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn test_gemini_error_does_not_leak_key() {
    let app = Router::new().fallback(|uri: Uri| async move {
        (StatusCode::BAD_REQUEST, format!("bad request for {}", uri))
    });
    let base = spawn_upstream(app).await;
    let adapter = create_adapter(&resolved(ProviderId::Google, &base, "gemini-2.5-flash")).unwrap();

    let err = adapter
        .generate_completion(&CompletionRequest::new(ProviderId::Google, "Hi").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::UpstreamRejected { status: 400, .. }));
    assert!(!err.to_string().contains("test-key-123456"));
}

#[tokio::test]
async fn test_anthropic_stream_until_message_stop() {
    let app = Router::new().route(
        "/v1/messages",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["stream"], true);
            event_stream(concat!(
                "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\n",
                "event: content_block_start\ndata: {\"type\":\"content_block_start\",\"index\":0}\n\n",
                "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Bon\"}}\n\n",
                "event: ping\ndata: {\"type\":\"ping\"}\n\n",
                "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"jour\"}}\n\n",
                "event: content_block_stop\ndata: {\"type\":\"content_block_stop\",\"index\":0}\n\n",
                "event: message_delta\ndata: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"}}\n\n",
                "event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
                "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"ignored\"}}\n\n",
            ))
        }),
    );
    let base = spawn_upstream(app).await;

    let (outcome, fragments) = stream_all(ProviderId::Anthropic, &base, "Say hello in French").await;
    outcome.unwrap();
    assert_eq!(fragments, vec!["Bon", "jour"]);
}

#[tokio::test]
async fn test_groq_stream_fragments() {
    let app = Router::new().route(
        "/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(headers["authorization"], "Bearer test-key-123456");
            assert_eq!(body["stream"], true);
            event_stream(concat!(
                "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"Fast \"}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"answer\"}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}],\"x_groq\":{\"usage\":{\"completion_tokens\":2}}}\n\n",
                "data: [DONE]\n\n",
            ))
        }),
    );
    let base = spawn_upstream(app).await;

    let (outcome, fragments) = stream_all(ProviderId::Groq, &base, "Hi").await;
    outcome.unwrap();
    assert_eq!(fragments, vec!["Fast ", "answer"]);
}

#[tokio::test]
async fn test_gemini_rejects_model_that_rewrites_path() {
    let hits = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().fallback(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            StatusCode::OK
        }
    });
    let base = spawn_upstream(app).await;
    let adapter = create_adapter(&resolved(ProviderId::Google, &base, "gemini-2.5-flash")).unwrap();

    for model in ["../../v1/files", "gemini-2.5-flash:generateContent?alt=sse"] {
        let request = CompletionRequest::new(ProviderId::Google, "Hi").unwrap().with_model(Some(model));
        let err = adapter.generate_completion(&request).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)), "model: {model}");
    }
    assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 0);
}
