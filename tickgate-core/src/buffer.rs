//! The message transit buffer.
//!
//! Holds intercepted messages in arrival order. Every release operation walks
//! the queue front to back and splices matches out, so the released and the
//! retained subsequences both keep their relative order within a direction.
//! Released snapshots are handed back to the caller, which re-injects them
//! into their original delivery path exactly once.

use crate::types::{Direction, Message, MessageSnapshot, Millis, Position};
use std::collections::VecDeque;

/// Outcome of [`TransitBuffer::cancel_all`].
#[derive(Debug)]
pub struct Cancellation<M> {
    /// Where local state should be put back, if any position was held
    pub rewind_to: Option<Position>,
    /// Non-movement snapshots to release, in arrival order
    pub released: Vec<MessageSnapshot<M>>,
    /// Outbound movement snapshots dropped without transmission
    pub discarded: usize,
}

pub struct TransitBuffer<M> {
    queue: VecDeque<MessageSnapshot<M>>,
}

impl<M: Message> TransitBuffer<M> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Take ownership of `payload`; its normal delivery is suppressed.
    pub fn hold(&mut self, payload: M, direction: Direction, now: Millis) {
        self.queue
            .push_back(MessageSnapshot::new(payload, direction, now));
    }

    /// Release every snapshot matching `predicate`, in arrival order.
    /// Non-matching snapshots stay queued in their original order.
    pub fn flush<F>(&mut self, mut predicate: F) -> Vec<MessageSnapshot<M>>
    where
        F: FnMut(&MessageSnapshot<M>) -> bool,
    {
        let mut released = Vec::new();
        let mut retained = VecDeque::with_capacity(self.queue.len());

        for snapshot in self.queue.drain(..) {
            if predicate(&snapshot) {
                released.push(snapshot);
            } else {
                retained.push_back(snapshot);
            }
        }

        self.queue = retained;
        released
    }

    pub fn flush_direction(&mut self, direction: Direction) -> Vec<MessageSnapshot<M>> {
        self.flush(|snapshot| snapshot.direction == direction)
    }

    pub fn flush_all(&mut self) -> Vec<MessageSnapshot<M>> {
        self.queue.drain(..).collect()
    }

    /// Release everything up to and including the `count`-th causal marker.
    ///
    /// With fewer than `count` markers held this releases the whole buffer.
    /// A count of zero releases nothing.
    pub fn flush_first(&mut self, count: usize) -> Vec<MessageSnapshot<M>> {
        if count == 0 {
            return Vec::new();
        }

        let mut markers = 0;
        let mut cut = self.queue.len();
        for (index, snapshot) in self.queue.iter().enumerate() {
            if snapshot.is_causal_marker() {
                markers += 1;
                if markers == count {
                    cut = index + 1;
                    break;
                }
            }
        }

        self.queue.drain(..cut).collect()
    }

    /// Abort the held state: local movement is dropped, everything else is
    /// released, and the earliest held position is reported for rewinding.
    pub fn cancel_all(&mut self) -> Cancellation<M> {
        let rewind_to = self.positions().next();

        let mut released = Vec::new();
        let mut discarded = 0;
        for snapshot in self.queue.drain(..) {
            if snapshot.is_local_movement() {
                discarded += 1;
            } else {
                released.push(snapshot);
            }
        }

        Cancellation {
            rewind_to,
            released,
            discarded,
        }
    }

    /// Drop everything without replay. Returns the number of dropped snapshots.
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    /// Outbound positions the peer has not seen yet, oldest first.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.queue
            .iter()
            .filter_map(MessageSnapshot::committed_position)
    }

    /// Edit held payloads of one direction before they are released.
    pub fn rewrite<F>(&mut self, direction: Direction, mut action: F)
    where
        F: FnMut(&mut M),
    {
        self.queue
            .iter_mut()
            .filter(|snapshot| snapshot.direction == direction)
            .for_each(|snapshot| action(&mut snapshot.payload));
    }

    /// Arrival time of the oldest held snapshot, optionally for one direction.
    pub fn oldest_arrival(&self, direction: Option<Direction>) -> Option<Millis> {
        self.queue
            .iter()
            .find(|snapshot| direction.is_none_or(|d| snapshot.direction == d))
            .map(|snapshot| snapshot.arrived_at)
    }

    /// Whether the oldest held snapshot has waited at least `delay`.
    pub fn is_above_time(&self, delay: Millis, now: Millis) -> bool {
        self.oldest_arrival(None)
            .is_some_and(|arrived_at| now.saturating_sub(arrived_at) >= delay)
    }

    pub fn is_holding(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn len_in(&self, direction: Direction) -> usize {
        self.queue
            .iter()
            .filter(|snapshot| snapshot.direction == direction)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageSnapshot<M>> {
        self.queue.iter()
    }
}

impl<M: Message> Default for TransitBuffer<M> {
    fn default() -> Self {
        Self::new()
    }
}
