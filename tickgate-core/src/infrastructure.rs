use crate::types::{Millis, Position};
use std::time::{SystemTime, UNIX_EPOCH};

/// The protocol layer a session re-injects released messages into.
pub trait Connection<M> {
    /// Whether the underlying transport is still usable
    fn is_open(&self) -> bool;

    /// Transmit to the peer without passing through interception again
    fn send_silently(&mut self, message: M);

    /// Run the client's normal handling for a received message
    fn handle_inbound(&mut self, message: M);

    /// Move local simulation state back to `position`
    fn reset_position(&mut self, position: Position);
}

/// Continuous wall-clock source.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Millis
    }
}
