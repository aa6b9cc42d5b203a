use axum::{extract::State, Json};
use serde_json::{json, Value};
use crate::api::AppState;
use crate::llm::catalog::PROVIDERS;

/// Availability of every supported provider. Credentials are never listed.
pub async fn list_providers(State(state): State<AppState>) -> Json<Value> {
    let registry = state.gateway.registry();
    let providers: Vec<Value> = PROVIDERS
        .iter()
        .map(|info| {
            let model = registry
                .resolve(info.id)
                .map(|adapter| adapter.model_name().to_string())
                .unwrap_or_else(|_| info.default_model.to_string());
            json!({
                "id": info.id,
                "name": info.name,
                "available": registry.is_available(info.id),
                "model": model,
                "streaming": if info.native_streaming { "native" } else { "single-chunk" },
            })
        })
        .collect();

    Json(json!({ "providers": providers }))
}
