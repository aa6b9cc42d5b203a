use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use serde_json::json;
use crate::api::AppState;

pub async fn api_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    if let Some(expected_token) = state.api_token.as_deref() {
        let auth_header = request.headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) if token == expected_token => {}
            Some(_) => {
                return Err((StatusCode::UNAUTHORIZED, Json(json!({"success": false, "error": "Invalid API token"}))));
            }
            None => {
                return Err((StatusCode::UNAUTHORIZED, Json(json!({"success": false, "error": "Missing Authorization header"}))));
            }
        }
    }

    Ok(next.run(request).await)
}
