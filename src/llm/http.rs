//! Response handling shared by every adapter: status checks, JSON decoding
//! and transport error mapping.

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use crate::errors::GatewayError;
use super::types::ProviderId;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ERROR_BODY: usize = 512;

pub fn build_client(provider: ProviderId) -> Result<Client, GatewayError> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| GatewayError::Config(format!("Failed to build HTTP client for {}: {}", provider, e)))
}

pub fn send_error(provider: ProviderId, e: reqwest::Error) -> GatewayError {
    let e = e.without_url();
    if e.is_timeout() {
        GatewayError::network(provider.as_str(), format!("request timed out: {}", e))
    } else {
        GatewayError::network(provider.as_str(), format!("request failed: {}", e))
    }
}

/// Pass successful responses through; turn anything else into
/// `UpstreamRejected` carrying the provider's own error message.
pub async fn ensure_success(provider: ProviderId, resp: Response) -> Result<Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(GatewayError::rejected(provider.as_str(), status.as_u16(), error_message(&body, status)))
}

pub async fn read_json(provider: ProviderId, resp: Response) -> Result<Value, GatewayError> {
    let text = resp.text().await.map_err(|e| send_error(provider, e))?;
    serde_json::from_str(&text)
        .map_err(|e| GatewayError::protocol(provider.as_str(), format!("invalid JSON body: {}", e)))
}

/// Best-effort extraction of a human-readable message from an error body.
pub fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(data) = serde_json::from_str::<Value>(body) {
        let candidates = [&data["error"]["message"], &data["error"], &data["message"]];
        if let Some(msg) = candidates.iter().find_map(|v| v.as_str()) {
            return msg.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status.canonical_reason().unwrap_or("request rejected").to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}
