#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use guardgate::config::GuardrailsConfig;
use guardgate::errors::GatewayError;
use guardgate::llm::{
    CompletionRequest, CompletionResult, FragmentSink, ProviderAdapter, ProviderId, ProviderRegistry, Usage,
};
use guardgate::moderation::Guardrails;

/// Adapter double that replays a fixed script and counts every call.
pub struct ScriptedAdapter {
    provider: ProviderId,
    fragments: Vec<String>,
    failure: Option<fn() -> GatewayError>,
    calls: AtomicUsize,
}

impl ScriptedAdapter {
    pub fn new(provider: ProviderId, fragments: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            provider,
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            failure: None,
            calls: AtomicUsize::new(0),
        })
    }

    /// Emits the fragments, then fails.
    pub fn failing(provider: ProviderId, fragments: &[&str], failure: fn() -> GatewayError) -> Arc<Self> {
        Arc::new(Self {
            provider,
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            failure: Some(failure),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    async fn generate_completion(&self, request: &CompletionRequest) -> Result<CompletionResult, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(CompletionResult::new(
            self.provider,
            self.model_for(request),
            self.fragments.concat(),
            Some("stop"),
            Usage::new(Some(3), Some(5)),
        ))
    }

    async fn generate_streaming_completion(
        &self,
        _request: &CompletionRequest,
        sink: &FragmentSink,
    ) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for fragment in &self.fragments {
            sink.emit(fragment.as_str()).await?;
        }
        match self.failure {
            Some(failure) => Err(failure()),
            None => Ok(()),
        }
    }

    fn provider_id(&self) -> ProviderId { self.provider }
    fn model_name(&self) -> &str { "scripted-model" }
}

pub fn registry_with(adapter: Arc<ScriptedAdapter>) -> Arc<ProviderRegistry> {
    Arc::new(ProviderRegistry::empty().with_adapter(adapter))
}

pub fn guardrails(enabled: bool) -> Guardrails {
    let config = GuardrailsConfig { enabled, ..Default::default() };
    Guardrails::from_config(&config).unwrap()
}
