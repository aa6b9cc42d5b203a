use std::sync::Arc;
use futures::Stream;
use tokio::sync::mpsc;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;
use crate::errors::GatewayError;
use crate::llm::{CompletionRequest, FragmentSink, ProviderAdapter, ProviderRegistry, StreamChunk};
use crate::moderation::{Direction, Guardrails};
use super::state::{RelayState, Transitions};

/// Streaming completion path.
///
/// Only the prompt is moderated. Completion fragments are forwarded as they
/// arrive and are not checked by the response classifier, since the full
/// text only exists once the stream has ended.
#[derive(Clone)]
pub struct StreamRelay {
    registry: Arc<ProviderRegistry>,
    guardrails: Guardrails,
}

/// Caller side of a relayed stream. Dropping it stops the relay and
/// releases the upstream connection.
pub struct RelayStream {
    rx: mpsc::Receiver<StreamChunk>,
}

impl RelayStream {
    fn new(rx: mpsc::Receiver<StreamChunk>) -> Self {
        Self { rx }
    }

    pub async fn next(&mut self) -> Option<StreamChunk> {
        self.rx.recv().await
    }

    /// Drain every chunk until the relay closes.
    pub async fn collect(mut self) -> Vec<StreamChunk> {
        let mut chunks = Vec::new();
        while let Some(chunk) = self.rx.recv().await {
            chunks.push(chunk);
        }
        chunks
    }

    pub fn into_stream(self) -> impl Stream<Item = StreamChunk> + Send {
        futures::stream::unfold(self.rx, |mut rx| async move {
            rx.recv().await.map(|chunk| (chunk, rx))
        })
    }
}

impl StreamRelay {
    pub fn new(registry: Arc<ProviderRegistry>, guardrails: Guardrails) -> Self {
        Self { registry, guardrails }
    }

    /// Moderate the prompt, then start relaying.
    ///
    /// A rejected prompt is not an error: the returned stream carries exactly
    /// one error chunk followed by `Done`, and no provider is called. An
    /// unavailable provider is reported as `Err` so the caller can still
    /// answer without opening a stream.
    pub fn open(&self, request: CompletionRequest) -> Result<RelayStream, GatewayError> {
        let span = info_span!(
            "stream",
            request_id = %Uuid::new_v4(),
            provider = %request.provider(),
        );
        let _guard = span.enter();
        let mut state = Transitions::new(RelayState::Start);

        state.advance(RelayState::InputCheck);
        let verdict = self.guardrails.check_input(request.prompt());
        if !verdict.is_safe {
            state.advance(RelayState::Rejected);
            warn!(category = %verdict.category, reason = %verdict.reason, "Streaming prompt rejected by input moderation");
            let message = self.guardrails.safe_message(&verdict, Direction::Input).to_string();
            let (tx, rx) = mpsc::channel(2);
            let _ = tx.try_send(StreamChunk::Error { message, category: Some(verdict.category) });
            let _ = tx.try_send(StreamChunk::Done);
            state.advance(RelayState::Closed);
            return Ok(RelayStream::new(rx));
        }

        let adapter = self.registry.resolve(request.provider())?;
        state.advance(RelayState::OpenStream);

        // Capacity 1: at most one fragment waits for the caller.
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(relay(adapter, request, tx, state).instrument(span.clone()));
        Ok(RelayStream::new(rx))
    }
}

async fn relay(
    adapter: Arc<dyn ProviderAdapter>,
    request: CompletionRequest,
    tx: mpsc::Sender<StreamChunk>,
    mut state: Transitions<RelayState>,
) {
    let sink = FragmentSink::new(tx.clone());
    state.advance(RelayState::Relaying);

    let outcome = tokio::select! {
        result = adapter.generate_streaming_completion(&request, &sink) => result,
        _ = tx.closed() => Err(GatewayError::Cancelled),
    };

    match outcome {
        Ok(()) => {
            let _ = tx.send(StreamChunk::Done).await;
        }
        Err(GatewayError::Cancelled) => {
            debug!("Caller disconnected, upstream stream dropped");
        }
        Err(e) => {
            warn!(error = %e, kind = ?e.upstream_kind(), "Stream failed mid-relay");
            let _ = tx.send(StreamChunk::error(e.to_string())).await;
            let _ = tx.send(StreamChunk::Done).await;
        }
    }
    state.advance(RelayState::Closed);
}
