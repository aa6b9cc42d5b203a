use async_trait::async_trait;
use tokio::sync::mpsc;
use crate::errors::GatewayError;
use super::types::{CompletionRequest, CompletionResult, ProviderId, StreamChunk};

/// Per-provider translator behind the provider-neutral completion contract.
///
/// Adapters hold configuration only. They never retry; every transport,
/// status or payload failure comes back as a normalized upstream error.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Single request/response round trip.
    async fn generate_completion(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResult, GatewayError>;

    /// Push content fragments into `sink` in arrival order, then return.
    /// A closed sink surfaces as [`GatewayError::Cancelled`].
    async fn generate_streaming_completion(
        &self,
        request: &CompletionRequest,
        sink: &FragmentSink,
    ) -> Result<(), GatewayError>;

    fn provider_id(&self) -> ProviderId;

    /// Model used when the request does not name one
    fn model_name(&self) -> &str;

    fn model_for<'a>(&'a self, request: &'a CompletionRequest) -> &'a str {
        request.model().unwrap_or_else(|| self.model_name())
    }
}

/// Receiving end of a streamed completion, handed to adapters.
#[derive(Clone)]
pub struct FragmentSink {
    tx: mpsc::Sender<StreamChunk>,
}

impl FragmentSink {
    pub fn new(tx: mpsc::Sender<StreamChunk>) -> Self {
        Self { tx }
    }

    /// Forward one content fragment. Empty fragments are dropped.
    pub async fn emit(&self, fragment: impl Into<String>) -> Result<(), GatewayError> {
        let fragment = fragment.into();
        if fragment.is_empty() {
            return Ok(());
        }
        self.tx
            .send(StreamChunk::Content(fragment))
            .await
            .map_err(|_| GatewayError::Cancelled)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
