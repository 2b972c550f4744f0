//! Priority arbitration over a single shared value.
//!
//! Every module that wants to drive a resource submits a request each tick it
//! cares about. The arbiter keeps at most one request per owner and exposes the
//! value of the winning one: highest priority first, earliest submission on ties.

use crate::types::{ArbitrationRequest, OwnerId, Priority, Ticks};
use tracing::trace;

pub struct Arbiter<T> {
    requests: Vec<ArbitrationRequest<T>>,
    next_sequence: u64,
}

impl<T> Arbiter<T> {
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Register or replace `owner`'s request. Always accepted.
    ///
    /// A renewal keeps the owner's place in the tie-break order and resets
    /// its countdown to `ttl`.
    pub fn submit(&mut self, owner: &OwnerId, value: T, priority: Priority, ttl: Ticks) {
        if let Some(request) = self.requests.iter_mut().find(|r| &r.owner == owner) {
            trace!(owner = %owner, priority = %priority, ttl, sequence = request.sequence, "request renewed");
            request.value = value;
            request.priority = priority;
            request.ttl = ttl;
            request.remaining = ttl;
            return;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        trace!(owner = %owner, priority = %priority, ttl, sequence, "request submitted");
        self.requests.push(ArbitrationRequest::new(
            owner.clone(),
            value,
            priority,
            ttl,
            sequence,
        ));
    }

    /// The winning request, if anyone claims the resource.
    pub fn active(&self) -> Option<&ArbitrationRequest<T>> {
        self.requests.iter().fold(None, |best, candidate| match best {
            Some(best) if !candidate.outranks(best) => Some(best),
            _ => Some(candidate),
        })
    }

    pub fn current_value(&self) -> Option<&T> {
        self.active().map(|r| &r.value)
    }

    pub fn current_owner(&self) -> Option<&OwnerId> {
        self.active().map(|r| &r.owner)
    }

    /// Whether `owner` currently drives the resource.
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        self.current_owner() == Some(owner)
    }

    pub fn is_claimed(&self) -> bool {
        !self.requests.is_empty()
    }

    /// Withdraw `owner`'s request. Returns false if it held none.
    pub fn release(&mut self, owner: &OwnerId) -> bool {
        let before = self.requests.len();
        self.requests.retain(|r| &r.owner != owner);
        before != self.requests.len()
    }

    /// Age every live request by one tick and evict the ones that ran out.
    /// Returns the number of evicted requests.
    pub fn tick(&mut self) -> usize {
        let before = self.requests.len();
        self.requests.retain_mut(|request| {
            if request.remaining == 0 {
                trace!(owner = %request.owner, sequence = request.sequence, "request expired");
                false
            } else {
                request.remaining -= 1;
                true
            }
        });
        before - self.requests.len()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    pub fn requests(&self) -> impl Iterator<Item = &ArbitrationRequest<T>> {
        self.requests.iter()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl<T> Default for Arbiter<T> {
    fn default() -> Self {
        Self::new()
    }
}
