//! Decisions returned by modules consulted on every intercepted message.

use crate::types::{Direction, Message, MessageSnapshot, Millis, OwnerId, Priority};
use serde::{Deserialize, Serialize};

/// Which held snapshots a flush decision releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushFilter {
    /// Same direction as the message (or poll) that triggered the decision
    SameDirection,
    Direction(Direction),
    All,
    /// Snapshots that have waited at least this long
    OlderThan(Millis),
}

impl FlushFilter {
    pub fn matches<M>(&self, snapshot: &MessageSnapshot<M>, current: Direction, now: Millis) -> bool {
        match *self {
            FlushFilter::SameDirection => snapshot.direction == current,
            FlushFilter::Direction(direction) => snapshot.direction == direction,
            FlushFilter::All => true,
            FlushFilter::OlderThan(delay) => now.saturating_sub(snapshot.arrived_at) >= delay,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Let the message through untouched
    Pass,
    /// Hold the message
    Queue,
    /// Release matching held messages, then let the message through
    FlushAllMatching(FlushFilter),
}

impl Decision {
    /// What happens when no module has an opinion: nothing stays held.
    pub const DEFAULT: Decision = Decision::FlushAllMatching(FlushFilter::SameDirection);
}

/// What a decider gets to look at.
pub struct DecisionContext<'a, M> {
    /// The intercepted message; `None` on a periodic poll
    pub message: Option<&'a M>,
    pub direction: Direction,
    pub now: Millis,
    /// Snapshots held in `direction`
    pub held: usize,
    /// Outbound positions held
    pub held_positions: usize,
    /// Arrival of the oldest snapshot held in `direction`
    pub oldest_arrival: Option<Millis>,
}

impl<M> DecisionContext<'_, M> {
    /// How long the oldest snapshot in this direction has been held.
    pub fn held_for(&self) -> Option<Millis> {
        self.oldest_arrival
            .map(|arrived_at| self.now.saturating_sub(arrived_at))
    }
}

/// A module's vote on an intercepted message. `None` abstains.
pub trait Decider<M> {
    fn decide(&self, context: &DecisionContext<'_, M>) -> Option<Decision>;
}

impl<M, F> Decider<M> for F
where
    F: Fn(&DecisionContext<'_, M>) -> Option<Decision>,
{
    fn decide(&self, context: &DecisionContext<'_, M>) -> Option<Decision> {
        self(context)
    }
}

/// Built-in holding behaviours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HoldStrategy {
    /// Hold everything in `direction` until released explicitly.
    Blink { direction: Direction },
    /// Hold messages in `direction` until the oldest one has waited `hold_ms`,
    /// then stop voting so the direction drains.
    Delay { direction: Direction, hold_ms: Millis },
}

impl HoldStrategy {
    pub fn direction(&self) -> Direction {
        match *self {
            HoldStrategy::Blink { direction } | HoldStrategy::Delay { direction, .. } => direction,
        }
    }
}

impl<M: Message> Decider<M> for HoldStrategy {
    fn decide(&self, context: &DecisionContext<'_, M>) -> Option<Decision> {
        if context.direction != self.direction() {
            return None;
        }

        match *self {
            HoldStrategy::Blink { .. } => Some(Decision::Queue),
            HoldStrategy::Delay { hold_ms, .. } => match context.held_for() {
                Some(waited) if waited >= hold_ms => None,
                _ => Some(Decision::Queue),
            },
        }
    }
}

struct Registered<M> {
    owner: OwnerId,
    priority: Priority,
    sequence: u64,
    decider: Box<dyn Decider<M>>,
}

/// Registry of deciders, one per owner.
///
/// Consulted in `(priority desc, registration asc)` order; the first vote wins.
pub struct Deciders<M> {
    entries: Vec<Registered<M>>,
    next_sequence: u64,
}

impl<M> Deciders<M> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Register `decider` for `owner`, replacing any previous one.
    pub fn register<D>(&mut self, owner: &OwnerId, priority: Priority, decider: D)
    where
        D: Decider<M> + 'static,
    {
        self.entries.retain(|entry| &entry.owner != owner);

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let position = self
            .entries
            .iter()
            .position(|entry| entry.priority < priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            position,
            Registered {
                owner: owner.clone(),
                priority,
                sequence,
                decider: Box::new(decider),
            },
        );
    }

    pub fn unregister(&mut self, owner: &OwnerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| &entry.owner != owner);
        before != self.entries.len()
    }

    pub fn decide(&self, context: &DecisionContext<'_, M>) -> Decision {
        self.entries
            .iter()
            .find_map(|entry| entry.decider.decide(context))
            .unwrap_or(Decision::DEFAULT)
    }

    /// Owners in consultation order.
    pub fn owners(&self) -> impl Iterator<Item = &OwnerId> {
        self.entries.iter().map(|entry| &entry.owner)
    }

    /// Registration order of `owner`, if registered.
    pub fn sequence_of(&self, owner: &OwnerId) -> Option<u64> {
        self.entries
            .iter()
            .find(|entry| &entry.owner == owner)
            .map(|entry| entry.sequence)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M> Default for Deciders<M> {
    fn default() -> Self {
        Self::new()
    }
}
