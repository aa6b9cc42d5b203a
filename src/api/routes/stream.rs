use std::convert::Infallible;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use serde_json::json;
use crate::api::models::ChatRequest;
use crate::api::AppState;
use crate::errors::GatewayError;
use crate::llm::StreamChunk;

/// Event-stream completion. Input moderation finishes before the response
/// headers are sent; a rejected prompt still gets a stream, holding one
/// error event and `[DONE]`.
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, GatewayError> {
    let request = req.into_completion_request()?;
    let relay = state.relay.open(request)?;
    let events = relay.into_stream().map(|chunk| Ok(to_event(chunk)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

pub fn to_event(chunk: StreamChunk) -> Event {
    match chunk {
        StreamChunk::Content(text) => Event::default().data(json!({ "content": text }).to_string()),
        StreamChunk::Error { message, category: Some(category) } => Event::default().data(
            json!({
                "error": "Content Policy Violation",
                "message": message,
                "moderation": { "isSafe": false, "category": category },
            })
            .to_string(),
        ),
        StreamChunk::Error { message, category: None } => Event::default().data(
            json!({ "error": "Upstream Error", "message": message }).to_string(),
        ),
        StreamChunk::Done => Event::default().data("[DONE]"),
    }
}
