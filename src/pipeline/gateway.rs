use std::sync::Arc;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;
use crate::errors::GatewayError;
use crate::llm::{CompletionRequest, CompletionResult, ProviderRegistry};
use crate::moderation::{Direction, Guardrails};
use super::state::{GatewayState, Transitions};

/// Non-streaming completion path:
/// input check, dispatch, response check, then substitution or passthrough.
#[derive(Clone)]
pub struct CompletionGateway {
    registry: Arc<ProviderRegistry>,
    guardrails: Guardrails,
}

impl CompletionGateway {
    pub fn new(registry: Arc<ProviderRegistry>, guardrails: Guardrails) -> Self {
        Self { registry, guardrails }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn guardrails(&self) -> &Guardrails {
        &self.guardrails
    }

    /// Run one request through the pipeline.
    ///
    /// Unsafe input fails with [`GatewayError::PolicyViolation`] before any
    /// provider call. Adapter errors are returned unmodified. An unsafe
    /// completion is replaced by the resolved safe message and the original
    /// text is kept in `original_content`.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, GatewayError> {
        let span = info_span!(
            "completion",
            request_id = %Uuid::new_v4(),
            provider = %request.provider(),
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &CompletionRequest) -> Result<CompletionResult, GatewayError> {
        let mut state = Transitions::new(GatewayState::Start);

        state.advance(GatewayState::InputCheck);
        let verdict = self.guardrails.check_input(request.prompt());
        if !verdict.is_safe {
            state.advance(GatewayState::Rejected);
            let message = self.guardrails.safe_message(&verdict, Direction::Input).to_string();
            warn!(category = %verdict.category, reason = %verdict.reason, "Prompt rejected by input moderation");
            return Err(GatewayError::PolicyViolation { verdict: Box::new(verdict), message });
        }

        state.advance(GatewayState::Dispatch);
        let adapter = self.registry.resolve(request.provider())?;
        let mut result = adapter.generate_completion(request).await.map_err(|e| {
            warn!(error = %e, kind = ?e.upstream_kind(), "Provider dispatch failed");
            e
        })?;

        state.advance(GatewayState::ResponseCheck);
        let verdict = self.guardrails.check_response(&result.content);
        if verdict.is_safe {
            state.advance(GatewayState::Passthrough);
        } else {
            state.advance(GatewayState::Substituted);
            warn!(
                categories = ?verdict.categories,
                model = %result.model,
                "Completion replaced by safe response"
            );
            let safe = self.guardrails.safe_message(&verdict, Direction::Response).to_string();
            result.original_content = Some(std::mem::replace(&mut result.content, safe));
            result.moderated = true;
            result.moderation = Some(verdict);
        }

        state.advance(GatewayState::Done);
        Ok(result)
    }
}
