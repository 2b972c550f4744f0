use super::{OwnerId, Priority, Ticks};

/// A claim on an arbitrated resource
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrationRequest<T> {
    /// Module that submitted the request
    pub owner: OwnerId,
    /// Proposed resource value
    pub value: T,
    /// Rank against competing requests
    pub priority: Priority,
    /// Ticks the request stays eligible without renewal
    pub ttl: Ticks,
    /// Ticks left before eviction
    pub remaining: Ticks,
    /// Submission order, breaks priority ties (earlier wins)
    pub sequence: u64,
}

impl<T> ArbitrationRequest<T> {
    pub fn new(owner: OwnerId, value: T, priority: Priority, ttl: Ticks, sequence: u64) -> Self {
        Self {
            owner,
            value,
            priority,
            ttl,
            remaining: ttl,
            sequence,
        }
    }

    /// Whether this request beats `other` under `(priority desc, sequence asc)`.
    pub fn outranks(&self, other: &Self) -> bool {
        self.priority > other.priority
            || (self.priority == other.priority && self.sequence < other.sequence)
    }
}
