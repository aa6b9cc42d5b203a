//! OpenAI chat-completions wire format, shared by the OpenAI-compatible and
//! Groq adapters.

use serde_json::{json, Map, Value};
use crate::errors::GatewayError;
use super::sse::{SseEvent, SseStep};
use super::types::{CompletionRequest, CompletionResult, ProviderId, Usage};

pub fn chat_body(model: &str, request: &CompletionRequest, stream: bool, max_stop: Option<usize>) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = request.system_prompt() {
        messages.push(json!({"role": "system", "content": system}));
    }
    for turn in request.dialogue() {
        messages.push(json!({"role": turn.role.as_str(), "content": turn.content}));
    }

    let mut body = Map::new();
    body.insert("model".into(), json!(model));
    body.insert("messages".into(), Value::Array(messages));

    let params = request.parameters();
    if let Some(t) = params.temperature {
        body.insert("temperature".into(), json!(t));
    }
    if let Some(n) = params.max_tokens {
        body.insert("max_tokens".into(), json!(n));
    }
    if let Some(p) = params.top_p {
        body.insert("top_p".into(), json!(p));
    }
    if let Some(f) = params.frequency_penalty {
        body.insert("frequency_penalty".into(), json!(f));
    }
    if let Some(p) = params.presence_penalty {
        body.insert("presence_penalty".into(), json!(p));
    }
    if !params.stop_sequences.is_empty() {
        let limit = max_stop.unwrap_or(params.stop_sequences.len());
        let stop: Vec<&String> = params.stop_sequences.iter().take(limit).collect();
        body.insert("stop".into(), json!(stop));
    }
    if stream {
        body.insert("stream".into(), json!(true));
    }
    Value::Object(body)
}

pub fn parse_chat_response(provider: ProviderId, model: &str, data: &Value) -> Result<CompletionResult, GatewayError> {
    if let Some(error) = data.get("error") {
        let msg = error["message"].as_str().unwrap_or("Unknown error");
        return Err(GatewayError::protocol(provider.as_str(), format!("error payload in success response: {}", msg)));
    }

    let choice = &data["choices"][0];
    let content = choice["message"]["content"]
        .as_str()
        .ok_or_else(|| GatewayError::protocol(provider.as_str(), "No content in chat completion response"))?
        .to_string();

    let usage = Usage::new(
        data["usage"]["prompt_tokens"].as_u64(),
        data["usage"]["completion_tokens"].as_u64(),
    );
    let model = data["model"].as_str().unwrap_or(model);

    Ok(CompletionResult::new(provider, model, content, choice["finish_reason"].as_str(), usage))
}

pub fn parse_stream_event(provider: ProviderId, event: &SseEvent) -> Result<SseStep, GatewayError> {
    let data = event.data.trim();
    if data == "[DONE]" {
        return Ok(SseStep::Finish);
    }

    let chunk: Value = serde_json::from_str(data)
        .map_err(|e| GatewayError::protocol(provider.as_str(), format!("invalid stream chunk: {}", e)))?;

    if let Some(error) = chunk.get("error") {
        let msg = error["message"].as_str().unwrap_or("Unknown stream error");
        return Err(GatewayError::rejected(provider.as_str(), 500, msg));
    }

    match chunk["choices"][0]["delta"]["content"].as_str() {
        Some(text) if !text.is_empty() => Ok(SseStep::Emit(text.to_string())),
        _ => Ok(SseStep::Skip),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{ChatTurn, GenerationParameters};

    fn request() -> CompletionRequest {
        CompletionRequest::new(ProviderId::OpenAI, "What about Rust?")
            .unwrap()
            .with_history(vec![ChatTurn::system("You are terse."), ChatTurn::user("Hi"), ChatTurn::assistant("Hello")])
            .with_parameters(GenerationParameters {
                temperature: Some(0.5),
                max_tokens: Some(64),
                stop_sequences: vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
                ..Default::default()
            })
    }

    #[test]
    fn test_chat_body_translation() {
        let body = chat_body("gpt-4o-mini", &request(), false, None);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][3]["content"], "What about Rust?");
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["max_tokens"], 64);
        assert!(body.get("top_p").is_none());
        assert!(body.get("stream").is_none());
        assert_eq!(body["stop"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_chat_body_stop_limit_and_stream() {
        let body = chat_body("llama", &request(), true, Some(4));
        assert_eq!(body["stop"].as_array().unwrap().len(), 4);
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn test_parse_chat_response() {
        let data = json!({
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"message": {"role": "assistant", "content": "Hi there"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2}
        });
        let result = parse_chat_response(ProviderId::OpenAI, "gpt-4o-mini", &data).unwrap();
        assert_eq!(result.content, "Hi there");
        assert_eq!(result.finish_reason, "stop");
        assert_eq!(result.model, "gpt-4o-mini-2024-07-18");
        assert_eq!(result.usage.unwrap().total_tokens, Some(7));
        assert!(!result.moderated);
    }

    #[test]
    fn test_parse_chat_response_missing_content() {
        let data = json!({"choices": []});
        assert!(matches!(
            parse_chat_response(ProviderId::Groq, "m", &data),
            Err(GatewayError::Protocol { .. })
        ));
    }

    #[test]
    fn test_parse_stream_events() {
        let event = |data: &str| SseEvent { event: None, data: data.to_string() };
        assert_eq!(
            parse_stream_event(ProviderId::OpenAI, &event(r#"{"choices":[{"delta":{"content":"Hel"}}]}"#)).unwrap(),
            SseStep::Emit("Hel".into())
        );
        assert_eq!(
            parse_stream_event(ProviderId::OpenAI, &event(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#)).unwrap(),
            SseStep::Skip
        );
        assert_eq!(parse_stream_event(ProviderId::OpenAI, &event("[DONE]")).unwrap(), SseStep::Finish);
        assert!(parse_stream_event(ProviderId::OpenAI, &event("not json")).is_err());
    }
}
