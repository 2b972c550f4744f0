use crate::infrastructure::{Clock, Connection};
use crate::types::{Millis, Position};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Something that reached the far side of a [`RecordingConnection`].
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery<M> {
    Sent(M),
    Handled(M),
    Reset(Position),
}

/// Connection that records everything delivered through it.
pub struct RecordingConnection<M> {
    open: bool,
    deliveries: Vec<Delivery<M>>,
}

impl<M> RecordingConnection<M> {
    pub fn new() -> Self {
        Self {
            open: true,
            deliveries: Vec::new(),
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Everything delivered so far, in delivery order.
    pub fn deliveries(&self) -> &[Delivery<M>] {
        &self.deliveries
    }

    pub fn take_deliveries(&mut self) -> Vec<Delivery<M>> {
        std::mem::take(&mut self.deliveries)
    }

    pub fn sent(&self) -> impl Iterator<Item = &M> {
        self.deliveries.iter().filter_map(|delivery| match delivery {
            Delivery::Sent(message) => Some(message),
            _ => None,
        })
    }

    pub fn handled(&self) -> impl Iterator<Item = &M> {
        self.deliveries.iter().filter_map(|delivery| match delivery {
            Delivery::Handled(message) => Some(message),
            _ => None,
        })
    }

    pub fn resets(&self) -> impl Iterator<Item = Position> + '_ {
        self.deliveries.iter().filter_map(|delivery| match delivery {
            Delivery::Reset(position) => Some(*position),
            _ => None,
        })
    }
}

impl<M> Default for RecordingConnection<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Connection<M> for RecordingConnection<M> {
    fn is_open(&self) -> bool {
        self.open
    }

    fn send_silently(&mut self, message: M) {
        self.deliveries.push(Delivery::Sent(message));
    }

    fn handle_inbound(&mut self, message: M) {
        self.deliveries.push(Delivery::Handled(message));
    }

    fn reset_position(&mut self, position: Position) {
        self.deliveries.push(Delivery::Reset(position));
    }
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn advance(&self, by: Millis) {
        self.now.fetch_add(by, Ordering::SeqCst);
    }

    pub fn set(&self, now: Millis) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::SeqCst)
    }
}
