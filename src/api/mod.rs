pub mod routes;
pub mod models;
pub mod errors;
pub mod auth;

use std::sync::Arc;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::config::GatewayConfig;
use crate::errors::GatewayError;
use crate::llm::ProviderRegistry;
use crate::moderation::Guardrails;
use crate::pipeline::{CompletionGateway, StreamRelay};

#[derive(Clone)]
pub struct AppState {
    pub gateway: CompletionGateway,
    pub relay: StreamRelay,
    /// Bearer token required on every route except health, when set.
    pub api_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(registry: Arc<ProviderRegistry>, guardrails: Guardrails) -> Self {
        Self {
            gateway: CompletionGateway::new(registry.clone(), guardrails.clone()),
            relay: StreamRelay::new(registry, guardrails),
            api_token: None,
        }
    }

    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.is_empty()).map(Arc::from);
        self
    }
}

/// Build the shared state once at startup. The registry is never mutated
/// afterwards.
pub fn create_app_state(config: &GatewayConfig) -> Result<AppState, GatewayError> {
    let registry = Arc::new(ProviderRegistry::from_config(config)?);
    let guardrails = Guardrails::from_config(&config.guardrails)?;
    Ok(AppState::new(registry, guardrails).with_api_token(config.server.api_token.clone()))
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/providers", axum::routing::get(routes::providers::list_providers))
        .route("/api/chat", axum::routing::post(routes::chat::chat))
        .route("/api/chat/stream", axum::routing::post(routes::stream::chat_stream))
        .route("/api/moderate", axum::routing::post(routes::moderate::moderate))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), auth::api_auth_middleware));

    Router::new()
        .route("/api/health", axum::routing::get(routes::health::health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
