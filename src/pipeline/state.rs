//! States of the two completion paths. Used for structured tracing of
//! every transition.

use serde::Serialize;
use tracing::debug;

/// Non-streaming path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayState {
    Start,
    InputCheck,
    Rejected,
    Dispatch,
    ResponseCheck,
    Substituted,
    Passthrough,
    Done,
}

impl std::fmt::Display for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "START"),
            Self::InputCheck => write!(f, "INPUT_CHECK"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Dispatch => write!(f, "DISPATCH"),
            Self::ResponseCheck => write!(f, "RESPONSE_CHECK"),
            Self::Substituted => write!(f, "SUBSTITUTED"),
            Self::Passthrough => write!(f, "PASSTHROUGH"),
            Self::Done => write!(f, "DONE"),
        }
    }
}

/// Streaming path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelayState {
    Start,
    InputCheck,
    Rejected,
    OpenStream,
    Relaying,
    Closed,
}

impl std::fmt::Display for RelayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "START"),
            Self::InputCheck => write!(f, "INPUT_CHECK"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::OpenStream => write!(f, "OPEN_STREAM"),
            Self::Relaying => write!(f, "RELAYING"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Tracks the current state and logs each move.
#[derive(Debug)]
pub struct Transitions<S> {
    current: S,
}

impl<S: Copy + std::fmt::Display> Transitions<S> {
    pub fn new(start: S) -> Self {
        Self { current: start }
    }

    pub fn advance(&mut self, next: S) {
        debug!(from = %self.current, to = %next, "state transition");
        self.current = next;
    }

    pub fn current(&self) -> S {
        self.current
    }
}
