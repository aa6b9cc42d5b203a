use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use crate::config::ResolvedProviderConfig;
use crate::errors::GatewayError;
use super::compat;
use super::http;
use super::provider::{FragmentSink, ProviderAdapter};
use super::sse;
use super::types::{CompletionRequest, CompletionResult, ProviderId};
use tracing::debug;

/// Groq accepts at most four stop sequences.
const MAX_STOP_SEQUENCES: usize = 4;

pub struct GroqProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GroqProvider {
    pub fn new(config: &ResolvedProviderConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: http::build_client(ProviderId::Groq)?,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    fn body(&self, request: &CompletionRequest, stream: bool) -> serde_json::Value {
        if request.parameters().stop_sequences.len() > MAX_STOP_SEQUENCES {
            debug!(
                given = request.parameters().stop_sequences.len(),
                kept = MAX_STOP_SEQUENCES,
                "Truncating stop sequences for Groq"
            );
        }
        compat::chat_body(self.model_for(request), request, stream, Some(MAX_STOP_SEQUENCES))
    }
}

#[async_trait]
impl ProviderAdapter for GroqProvider {
    async fn generate_completion(&self, request: &CompletionRequest) -> Result<CompletionResult, GatewayError> {
        let resp = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&self.body(request, false))
            .send()
            .await
            .map_err(|e| http::send_error(ProviderId::Groq, e))?;

        let resp = http::ensure_success(ProviderId::Groq, resp).await?;
        let data = http::read_json(ProviderId::Groq, resp).await?;
        compat::parse_chat_response(ProviderId::Groq, self.model_for(request), &data)
    }

    async fn generate_streaming_completion(
        &self,
        request: &CompletionRequest,
        sink: &FragmentSink,
    ) -> Result<(), GatewayError> {
        let resp = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("accept", "text/event-stream")
            .json(&self.body(request, true))
            .send()
            .await
            .map_err(|e| http::send_error(ProviderId::Groq, e))?;

        let resp = http::ensure_success(ProviderId::Groq, resp).await?;
        sse::pump(ProviderId::Groq, resp, sink, |event| {
            compat::parse_stream_event(ProviderId::Groq, event)
        })
        .await
    }

    fn provider_id(&self) -> ProviderId { ProviderId::Groq }
    fn model_name(&self) -> &str { &self.model }
}
