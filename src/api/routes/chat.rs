use std::time::Instant;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use crate::api::models::ChatRequest;
use crate::api::AppState;
use crate::errors::GatewayError;

pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<Value>, GatewayError> {
    let started = Instant::now();
    let request = req.into_completion_request()?;
    let result = state.gateway.complete(&request).await?;

    Ok(Json(json!({
        "success": true,
        "provider": result.provider,
        "model": result.model,
        "response": {
            "content": result.content,
            "usage": result.usage,
            "metadata": {
                "finishReason": result.finish_reason,
                "originalContent": result.original_content,
                "moderation": result.moderation,
            },
            "moderated": result.moderated,
        },
        "duration": started.elapsed().as_millis() as u64,
    })))
}
