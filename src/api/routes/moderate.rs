use axum::{extract::State, Json};
use serde_json::{json, Value};
use crate::api::models::ModerateRequest;
use crate::api::AppState;

/// Run one classifier directly. Honors the guardrails toggle.
pub async fn moderate(
    State(state): State<AppState>,
    Json(req): Json<ModerateRequest>,
) -> Json<Value> {
    let guardrails = state.gateway.guardrails();
    let verdict = guardrails.check(req.direction, &req.text);
    let safe_message = (!verdict.is_safe).then(|| guardrails.safe_message(&verdict, req.direction));

    Json(json!({
        "direction": req.direction,
        "failOpen": verdict.is_fail_open(),
        "verdict": verdict,
        "safeMessage": safe_message,
    }))
}
