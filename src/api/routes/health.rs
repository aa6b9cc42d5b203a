use axum::{extract::State, Json};
use serde_json::{json, Value};
use crate::api::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "guardgate",
        "version": env!("CARGO_PKG_VERSION"),
        "gitHash": option_env!("GIT_HASH").unwrap_or("dev"),
        "builtAt": option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        "guardrails": state.gateway.guardrails().enabled(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
