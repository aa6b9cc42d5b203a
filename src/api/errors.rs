use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use crate::errors::GatewayError;

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            GatewayError::PolicyViolation { verdict, message } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": "Content Policy Violation",
                    "message": message,
                    "moderation": {
                        "isSafe": false,
                        "category": verdict.category,
                        "categories": verdict.categories,
                        "reason": verdict.reason,
                    },
                }),
            ),
            GatewayError::Config(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({"success": false, "error": "Provider Unavailable", "message": msg}),
            ),
            GatewayError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({"success": false, "error": "Invalid Request", "message": msg}),
            ),
            GatewayError::Network { .. }
            | GatewayError::UpstreamRejected { .. }
            | GatewayError::Protocol { .. } => {
                let class = self.classify();
                (
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "success": false,
                        "error": "Upstream Error",
                        "provider": self.provider(),
                        "errorType": self.upstream_kind(),
                        "retryable": class.retryable,
                        "message": self.to_string(),
                    }),
                )
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"success": false, "error": "Internal Error", "message": self.to_string()}),
            ),
        };

        (status, Json(body)).into_response()
    }
}
