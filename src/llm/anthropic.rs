use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Map, Value};
use std::time::Duration;
use crate::config::ResolvedProviderConfig;
use crate::errors::GatewayError;
use super::http;
use super::provider::{FragmentSink, ProviderAdapter};
use super::sse::{self, SseEvent, SseStep};
use super::types::{CompletionRequest, CompletionResult, ProviderId, Usage};
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The Messages API requires max_tokens on every request.
const DEFAULT_MAX_TOKENS: u32 = 1024;

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl AnthropicProvider {
    pub fn new(config: &ResolvedProviderConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: http::build_client(ProviderId::Anthropic)?,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    fn post(&self, body: &Value) -> RequestBuilder {
        self.client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
    }
}

/// Penalties have no Messages API counterpart and are left out.
pub fn messages_body(model: &str, request: &CompletionRequest, stream: bool) -> Value {
    let messages: Vec<Value> = request
        .dialogue()
        .into_iter()
        .map(|turn| json!({"role": turn.role.as_str(), "content": turn.content}))
        .collect();

    let params = request.parameters();
    let mut body = Map::new();
    body.insert("model".into(), json!(model));
    body.insert("max_tokens".into(), json!(params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)));
    body.insert("messages".into(), Value::Array(messages));

    if let Some(system) = request.system_prompt() {
        body.insert("system".into(), json!(system));
    }
    if let Some(t) = params.temperature {
        body.insert("temperature".into(), json!(t));
    }
    if let Some(p) = params.top_p {
        body.insert("top_p".into(), json!(p));
    }
    if !params.stop_sequences.is_empty() {
        body.insert("stop_sequences".into(), json!(params.stop_sequences));
    }
    if stream {
        body.insert("stream".into(), json!(true));
    }
    Value::Object(body)
}

pub fn parse_messages_response(model: &str, data: &Value) -> Result<CompletionResult, GatewayError> {
    let blocks = data["content"].as_array().ok_or_else(|| {
        GatewayError::protocol(ProviderId::Anthropic.as_str(), "No content in Anthropic response")
    })?;

    let content = blocks
        .iter()
        .filter(|b| b["type"] == "text")
        .filter_map(|b| b["text"].as_str())
        .collect::<Vec<_>>()
        .join("");

    let usage = Usage::new(
        data["usage"]["input_tokens"].as_u64(),
        data["usage"]["output_tokens"].as_u64(),
    );
    let model = data["model"].as_str().unwrap_or(model);

    Ok(CompletionResult::new(ProviderId::Anthropic, model, content, data["stop_reason"].as_str(), usage))
}

pub fn parse_stream_event(event: &SseEvent) -> Result<SseStep, GatewayError> {
    let data: Value = serde_json::from_str(&event.data).map_err(|e| {
        GatewayError::protocol(ProviderId::Anthropic.as_str(), format!("invalid stream event: {}", e))
    })?;

    match data["type"].as_str().unwrap_or_default() {
        "content_block_delta" => match data["delta"]["text"].as_str() {
            Some(text) if data["delta"]["type"] == "text_delta" => Ok(SseStep::Emit(text.to_string())),
            _ => Ok(SseStep::Skip),
        },
        "message_stop" => Ok(SseStep::Finish),
        "error" => {
            let kind = data["error"]["type"].as_str().unwrap_or_default();
            let message = data["error"]["message"].as_str().unwrap_or("Unknown stream error");
            Err(GatewayError::rejected(ProviderId::Anthropic.as_str(), error_status(kind), message))
        }
        _ => Ok(SseStep::Skip),
    }
}

/// HTTP status Anthropic documents for each error type.
fn error_status(kind: &str) -> u16 {
    match kind {
        "invalid_request_error" => 400,
        "authentication_error" => 401,
        "permission_error" => 403,
        "not_found_error" => 404,
        "rate_limit_error" => 429,
        "overloaded_error" => 529,
        _ => 500,
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    async fn generate_completion(&self, request: &CompletionRequest) -> Result<CompletionResult, GatewayError> {
        let model = self.model_for(request);
        let body = messages_body(model, request, false);

        let resp = self
            .post(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| http::send_error(ProviderId::Anthropic, e))?;

        let resp = http::ensure_success(ProviderId::Anthropic, resp).await?;
        let data = http::read_json(ProviderId::Anthropic, resp).await?;
        let result = parse_messages_response(model, &data)?;

        debug!(
            model = %result.model,
            input_tokens = ?result.usage.as_ref().and_then(|u| u.input_tokens),
            output_tokens = ?result.usage.as_ref().and_then(|u| u.output_tokens),
            "Anthropic completion received"
        );
        Ok(result)
    }

    async fn generate_streaming_completion(
        &self,
        request: &CompletionRequest,
        sink: &FragmentSink,
    ) -> Result<(), GatewayError> {
        let body = messages_body(self.model_for(request), request, true);

        let resp = self
            .post(&body)
            .send()
            .await
            .map_err(|e| http::send_error(ProviderId::Anthropic, e))?;

        let resp = http::ensure_success(ProviderId::Anthropic, resp).await?;
        sse::pump(ProviderId::Anthropic, resp, sink, parse_stream_event).await
    }

    fn provider_id(&self) -> ProviderId { ProviderId::Anthropic }
    fn model_name(&self) -> &str { &self.model }
}
