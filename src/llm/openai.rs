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

/// Any endpoint speaking the OpenAI chat-completions protocol.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAIProvider {
    pub fn new(config: &ResolvedProviderConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: http::build_client(ProviderId::OpenAI)?,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAIProvider {
    async fn generate_completion(&self, request: &CompletionRequest) -> Result<CompletionResult, GatewayError> {
        let model = self.model_for(request);
        let body = compat::chat_body(model, request, false, None);

        let resp = self.client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| http::send_error(ProviderId::OpenAI, e))?;

        let resp = http::ensure_success(ProviderId::OpenAI, resp).await?;
        let data = http::read_json(ProviderId::OpenAI, resp).await?;
        let result = compat::parse_chat_response(ProviderId::OpenAI, model, &data)?;

        debug!(model = %result.model, finish_reason = %result.finish_reason, "OpenAI completion received");
        Ok(result)
    }

    async fn generate_streaming_completion(
        &self,
        request: &CompletionRequest,
        sink: &FragmentSink,
    ) -> Result<(), GatewayError> {
        let body = compat::chat_body(self.model_for(request), request, true, None);

        let resp = self.client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| http::send_error(ProviderId::OpenAI, e))?;

        let resp = http::ensure_success(ProviderId::OpenAI, resp).await?;
        sse::pump(ProviderId::OpenAI, resp, sink, |event| {
            compat::parse_stream_event(ProviderId::OpenAI, event)
        })
        .await
    }

    fn provider_id(&self) -> ProviderId { ProviderId::OpenAI }
    fn model_name(&self) -> &str { &self.model }
}
