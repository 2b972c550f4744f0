//! The interception pipeline: module votes, safety triggers and periodic polls
//! on top of the [`TransitBuffer`].

use crate::buffer::{Cancellation, TransitBuffer};
use crate::config::{AutoReset, ResetAction};
use crate::decision::{Decider, Deciders, Decision, DecisionContext, FlushFilter};
use crate::types::{Direction, Message, MessageSnapshot, Millis, OwnerId, Priority};
use tracing::{debug, warn};

/// Verdict for one intercepted message.
#[derive(Debug)]
pub enum Intercepted<M> {
    /// Re-inject `released` in order, then deliver `message` normally.
    Pass {
        released: Vec<MessageSnapshot<M>>,
        message: M,
    },
    /// The buffer took the message; suppress its normal delivery.
    Queued,
}

/// Outcome of a periodic auto-flush check.
#[derive(Debug)]
pub enum Poll<M> {
    Idle,
    /// Re-inject these, in order
    Released(Vec<MessageSnapshot<M>>),
    /// The connection is gone; this many snapshots were dropped without replay
    Discarded(usize),
    /// The auto-reset threshold was hit with [`ResetAction::Rewind`]
    Reset(Cancellation<M>),
}

pub struct Interceptor<M> {
    buffer: TransitBuffer<M>,
    deciders: Deciders<M>,
    auto_reset: Option<AutoReset>,
}

impl<M: Message> Interceptor<M> {
    pub fn new() -> Self {
        Self {
            buffer: TransitBuffer::new(),
            deciders: Deciders::new(),
            auto_reset: None,
        }
    }

    pub fn with_auto_reset(mut self, auto_reset: AutoReset) -> Self {
        self.auto_reset = Some(auto_reset);
        self
    }

    pub fn register<D>(&mut self, owner: &OwnerId, priority: Priority, decider: D)
    where
        D: Decider<M> + 'static,
    {
        self.deciders.register(owner, priority, decider);
    }

    pub fn unregister(&mut self, owner: &OwnerId) -> bool {
        self.deciders.unregister(owner)
    }

    /// Decide the fate of a message observed on its way in or out.
    ///
    /// Safety triggers flush their direction before any decider is consulted.
    pub fn intercept(&mut self, message: M, direction: Direction, now: Millis) -> Intercepted<M> {
        let kind = message.kind();
        if kind.forces_flush() {
            let released = self.buffer.flush_direction(direction);
            debug!(?kind, %direction, released = released.len(), "safety trigger flushed buffer");
            return Intercepted::Pass { released, message };
        }

        let decision = {
            let context = self.context(Some(&message), direction, now);
            self.deciders.decide(&context)
        };

        match decision {
            Decision::Pass => {
                return Intercepted::Pass {
                    released: Vec::new(),
                    message,
                };
            }
            Decision::FlushAllMatching(filter) => {
                let released = self.flush_matching(filter, direction, now);
                return Intercepted::Pass { released, message };
            }
            Decision::Queue => {}
        }

        if !kind.is_bufferable() {
            return Intercepted::Pass {
                released: Vec::new(),
                message,
            };
        }

        self.buffer.hold(message, direction, now);
        Intercepted::Queued
    }

    /// Periodic auto-flush check for one direction. The auto reset only
    /// fires on the outbound check.
    pub fn poll(&mut self, direction: Direction, now: Millis, connection_open: bool) -> Poll<M> {
        if !connection_open {
            let dropped = self.buffer.clear();
            if dropped > 0 {
                warn!(dropped, "connection closed, held messages discarded");
            }
            return Poll::Discarded(dropped);
        }

        if let Some(reset) = self.auto_reset.filter(|_| direction == Direction::Outbound) {
            let held_positions = self.buffer.positions().count();
            if held_positions > reset.after_positions {
                debug!(held_positions, action = ?reset.action, "auto reset");
                return match reset.action {
                    ResetAction::Rewind => Poll::Reset(self.buffer.cancel_all()),
                    ResetAction::Release => {
                        Poll::Released(self.buffer.flush_direction(Direction::Outbound))
                    }
                };
            }
        }

        let decision = {
            let context = self.context(None, direction, now);
            self.deciders.decide(&context)
        };

        match decision {
            Decision::FlushAllMatching(filter) => {
                let released = self.flush_matching(filter, direction, now);
                if released.is_empty() {
                    Poll::Idle
                } else {
                    Poll::Released(released)
                }
            }
            Decision::Pass | Decision::Queue => Poll::Idle,
        }
    }

    pub fn flush<F>(&mut self, predicate: F) -> Vec<MessageSnapshot<M>>
    where
        F: FnMut(&MessageSnapshot<M>) -> bool,
    {
        self.buffer.flush(predicate)
    }

    pub fn flush_first(&mut self, count: usize) -> Vec<MessageSnapshot<M>> {
        self.buffer.flush_first(count)
    }

    pub fn cancel_all(&mut self) -> Cancellation<M> {
        self.buffer.cancel_all()
    }

    pub fn clear(&mut self) -> usize {
        self.buffer.clear()
    }

    pub fn rewrite<F>(&mut self, direction: Direction, action: F)
    where
        F: FnMut(&mut M),
    {
        self.buffer.rewrite(direction, action);
    }

    pub fn buffer(&self) -> &TransitBuffer<M> {
        &self.buffer
    }

    pub fn deciders(&self) -> &Deciders<M> {
        &self.deciders
    }

    fn flush_matching(
        &mut self,
        filter: FlushFilter,
        direction: Direction,
        now: Millis,
    ) -> Vec<MessageSnapshot<M>> {
        let released = self
            .buffer
            .flush(|snapshot| filter.matches(snapshot, direction, now));
        if !released.is_empty() {
            debug!(?filter, %direction, released = released.len(), "buffer flushed");
        }
        released
    }

    fn context<'a>(
        &self,
        message: Option<&'a M>,
        direction: Direction,
        now: Millis,
    ) -> DecisionContext<'a, M> {
        DecisionContext {
            message,
            direction,
            now,
            held: self.buffer.len_in(direction),
            held_positions: self.buffer.positions().count(),
            oldest_arrival: self.buffer.oldest_arrival(Some(direction)),
        }
    }
}

impl<M: Message> Default for Interceptor<M> {
    fn default() -> Self {
        Self::new()
    }
}
