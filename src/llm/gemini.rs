use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::time::Duration;
use crate::config::credentials::redact_credentials;
use crate::config::ResolvedProviderConfig;
use crate::errors::GatewayError;
use super::http;
use super::provider::{FragmentSink, ProviderAdapter};
use super::types::{CompletionRequest, CompletionResult, ProviderId, Role, Usage};
use tracing::debug;

/// Google Gemini. Only `generateContent` is used, so streaming callers get
/// the whole completion as a single fragment.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(config: &ResolvedProviderConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: http::build_client(ProviderId::Google)?,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    /// The key travels in the query string; keep it out of error text.
    fn scrub(&self, err: GatewayError) -> GatewayError {
        match err {
            GatewayError::Network { provider, message } => GatewayError::Network {
                provider,
                message: redact_credentials(&message, &[&self.api_key]),
            },
            GatewayError::UpstreamRejected { provider, status, message } => GatewayError::UpstreamRejected {
                provider,
                status,
                message: redact_credentials(&message, &[&self.api_key]),
            },
            other => other,
        }
    }
}

/// The model name becomes a URL path segment. Anything that could change
/// the path or query is refused.
pub fn model_segment(model: &str) -> Result<&str, GatewayError> {
    let valid = !model.is_empty()
        && model != "."
        && model != ".."
        && model.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(model)
    } else {
        Err(GatewayError::InvalidRequest(format!("Invalid Gemini model name: '{}'", model)))
    }
}

pub fn generate_content_body(request: &CompletionRequest) -> Value {
    let contents: Vec<Value> = request
        .dialogue()
        .into_iter()
        .map(|turn| {
            let role = match turn.role {
                Role::Assistant => "model",
                _ => "user",
            };
            json!({"role": role, "parts": [{"text": turn.content}]})
        })
        .collect();

    let params = request.parameters();
    let mut generation = Map::new();
    if let Some(t) = params.temperature {
        generation.insert("temperature".into(), json!(t));
    }
    if let Some(n) = params.max_tokens {
        generation.insert("maxOutputTokens".into(), json!(n));
    }
    if let Some(p) = params.top_p {
        generation.insert("topP".into(), json!(p));
    }
    if let Some(f) = params.frequency_penalty {
        generation.insert("frequencyPenalty".into(), json!(f));
    }
    if let Some(p) = params.presence_penalty {
        generation.insert("presencePenalty".into(), json!(p));
    }
    if !params.stop_sequences.is_empty() {
        generation.insert("stopSequences".into(), json!(params.stop_sequences));
    }

    let mut body = Map::new();
    body.insert("contents".into(), Value::Array(contents));
    if let Some(system) = request.system_prompt() {
        body.insert("systemInstruction".into(), json!({"parts": [{"text": system}]}));
    }
    if !generation.is_empty() {
        body.insert("generationConfig".into(), Value::Object(generation));
    }
    Value::Object(body)
}

pub fn parse_generate_content(model: &str, data: &Value) -> Result<CompletionResult, GatewayError> {
    let provider = ProviderId::Google.as_str();
    let Some(candidate) = data["candidates"].as_array().and_then(|c| c.first()) else {
        if let Some(reason) = data["promptFeedback"]["blockReason"].as_str() {
            return Err(GatewayError::rejected(provider, 400, format!("prompt blocked by provider: {}", reason)));
        }
        return Err(GatewayError::protocol(provider, "No candidates in Gemini response"));
    };

    let content = candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect::<Vec<_>>().join(""))
        .unwrap_or_default();

    let usage = Usage::new(
        data["usageMetadata"]["promptTokenCount"].as_u64(),
        data["usageMetadata"]["candidatesTokenCount"].as_u64(),
    );
    let model = data["modelVersion"].as_str().unwrap_or(model);

    Ok(CompletionResult::new(ProviderId::Google, model, content, candidate["finishReason"].as_str(), usage))
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    async fn generate_completion(&self, request: &CompletionRequest) -> Result<CompletionResult, GatewayError> {
        let model = model_segment(self.model_for(request))?;
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let resp = self.client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .json(&generate_content_body(request))
            .send()
            .await
            .map_err(|e| self.scrub(http::send_error(ProviderId::Google, e)))?;

        let resp = http::ensure_success(ProviderId::Google, resp)
            .await
            .map_err(|e| self.scrub(e))?;
        let data = http::read_json(ProviderId::Google, resp).await?;
        let result = parse_generate_content(model, &data)?;

        debug!(model = %result.model, finish_reason = %result.finish_reason, "Gemini completion received");
        Ok(result)
    }

    async fn generate_streaming_completion(
        &self,
        request: &CompletionRequest,
        sink: &FragmentSink,
    ) -> Result<(), GatewayError> {
        let result = self.generate_completion(request).await?;
        sink.emit(result.content).await
    }

    fn provider_id(&self) -> ProviderId { ProviderId::Google }
    fn model_name(&self) -> &str { &self.model }
}
