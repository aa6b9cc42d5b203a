//! Server-sent event framing for streamed provider responses.

use futures::StreamExt;
use reqwest::Response;
use crate::errors::GatewayError;
use super::provider::FragmentSink;
use super::types::ProviderId;
use tracing::trace;

/// One decoded event block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

/// What an adapter wants done with a decoded event.
#[derive(Debug, Clone, PartialEq)]
pub enum SseStep {
    Emit(String),
    Skip,
    Finish,
}

/// Incremental decoder. Bytes are buffered until a blank line closes an
/// event, so fragments split across network reads are reassembled.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    /// Offset below which `buf` is known to hold no event separator.
    scanned: usize,
}

impl SseDecoder {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buf.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some((end, sep_len)) = find_boundary(&self.buf, self.scanned) {
            let block: Vec<u8> = self.buf.drain(..end + sep_len).take(end).collect();
            self.scanned = 0;
            if let Some(event) = parse_block(&String::from_utf8_lossy(&block)) {
                events.push(event);
            }
        }
        // A separator can straddle two reads: rescan its longest prefix only.
        self.scanned = self.buf.len().saturating_sub(3);
        events
    }

    /// Flush a trailing event that was not followed by a blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let rest = std::mem::take(&mut self.buf);
        self.scanned = 0;
        parse_block(&String::from_utf8_lossy(&rest))
    }
}

fn find_boundary(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let tail = &buf[from.min(buf.len())..];
    let lf = tail.windows(2).position(|w| w == b"\n\n").map(|p| (from + p, 2));
    let crlf = tail.windows(4).position(|w| w == b"\r\n\r\n").map(|p| (from + p, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn parse_block(block: &str) -> Option<SseEvent> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();
    for line in block.lines() {
        let line = line.trim_end_matches('\r');
        if line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("event:") {
            event = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }
    if data.is_empty() {
        return None;
    }
    Some(SseEvent { event, data: data.join("\n") })
}

/// Read an event-stream response to the end, forwarding fragments to `sink`.
///
/// Stops early when `on_event` returns [`SseStep::Finish`]. Dropping the
/// response on return releases the upstream connection.
pub async fn pump<F>(
    provider: ProviderId,
    response: Response,
    sink: &FragmentSink,
    mut on_event: F,
) -> Result<(), GatewayError>
where
    F: FnMut(&SseEvent) -> Result<SseStep, GatewayError> + Send,
{
    let mut stream = response.bytes_stream();
    let mut decoder = SseDecoder::default();

    while let Some(next) = stream.next().await {
        if sink.is_closed() {
            return Err(GatewayError::Cancelled);
        }
        let bytes = next.map_err(|e| {
            GatewayError::network(provider.as_str(), format!("stream interrupted: {}", e.without_url()))
        })?;
        for event in decoder.push(&bytes) {
            trace!(provider = %provider, data = %event.data, "sse event");
            match on_event(&event)? {
                SseStep::Emit(text) => sink.emit(text).await?,
                SseStep::Skip => {}
                SseStep::Finish => return Ok(()),
            }
        }
    }

    if let Some(event) = decoder.finish() {
        if let SseStep::Emit(text) = on_event(&event)? {
            sink.emit(text).await?;
        }
    }
    Ok(())
}
