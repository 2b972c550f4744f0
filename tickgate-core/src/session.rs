//! Per-connection context that ties the arbiters and the transit buffer to a
//! live connection and a clock.
//!
//! Built once when a session connects and passed by reference into every
//! module entry point. Everything here runs on the simulation thread.

use crate::buffer::Cancellation;
use crate::config::SessionConfig;
use crate::decision::Decider;
use crate::infrastructure::{Clock, Connection, SystemClock};
use crate::interceptor::{Intercepted, Interceptor, Poll};
use crate::resources::Arbiters;
use crate::types::{Direction, Message, MessageSnapshot, OwnerId, Priority};
use tracing::{debug, info, warn};

/// Where an intercepted message went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// Delivered now (after any releases it triggered)
    Delivered,
    /// Held by the buffer
    Held,
}

/// What happened during one [`Session::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// Arbitration requests that expired
    pub evicted: usize,
    /// Held messages re-injected by the auto-flush check
    pub released: usize,
    /// Held messages dropped because the connection was gone
    pub discarded: usize,
}

pub struct Session<M, C> {
    id: String,
    config: SessionConfig,
    tick: u64,
    arbiters: Arbiters,
    interceptor: Interceptor<M>,
    connection: C,
    clock: Box<dyn Clock>,
}

impl<M, C> Session<M, C>
where
    M: Message,
    C: Connection<M>,
{
    pub fn new(connection: C, config: SessionConfig) -> Self {
        Self::with_clock(connection, config, SystemClock)
    }

    pub fn with_clock(connection: C, config: SessionConfig, clock: impl Clock + 'static) -> Self {
        let mut interceptor = Interceptor::new();
        if let Some(reset) = config.auto_reset {
            interceptor = interceptor.with_auto_reset(reset);
        }
        for rule in &config.hold {
            interceptor.register(&rule.owner, rule.priority, rule.strategy);
        }

        let id = nanoid::nanoid!();
        info!(session_id = %id, hold_rules = config.hold.len(), "session opened");

        Self {
            id,
            config,
            tick: 0,
            arbiters: Arbiters::new(),
            interceptor,
            connection,
            clock: Box::new(clock),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Number of ticks run so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn arbiters(&self) -> &Arbiters {
        &self.arbiters
    }

    pub fn arbiters_mut(&mut self) -> &mut Arbiters {
        &mut self.arbiters
    }

    pub fn interceptor(&self) -> &Interceptor<M> {
        &self.interceptor
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn register_decider<D>(&mut self, owner: &OwnerId, priority: Priority, decider: D)
    where
        D: Decider<M> + 'static,
    {
        self.interceptor.register(owner, priority, decider);
    }

    pub fn unregister_decider(&mut self, owner: &OwnerId) -> bool {
        self.interceptor.unregister(owner)
    }

    /// A module stopped running: drop its claims and its decider.
    pub fn retire(&mut self, owner: &OwnerId) {
        self.arbiters.release_all(owner);
        self.interceptor.unregister(owner);
    }

    /// Start of a tick: expire arbitration requests, then run the outbound
    /// auto-flush check.
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;
        let evicted = self.arbiters.tick();

        let mut report = TickReport {
            tick: self.tick,
            evicted,
            ..TickReport::default()
        };
        self.poll(Direction::Outbound, &mut report);
        report
    }

    /// Inbound processing pass: run the inbound auto-flush check.
    pub fn process_inbound(&mut self) -> TickReport {
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };
        self.poll(Direction::Inbound, &mut report);
        report
    }

    pub fn intercept(&mut self, message: M, direction: Direction) -> Routing {
        let now = self.clock.now_ms();
        match self.interceptor.intercept(message, direction, now) {
            Intercepted::Pass { released, message } => {
                self.reinject(released);
                self.dispatch(direction, message);
                Routing::Delivered
            }
            Intercepted::Queued => Routing::Held,
        }
    }

    /// Route an outgoing message.
    pub fn send(&mut self, message: M) -> Routing {
        self.intercept(message, Direction::Outbound)
    }

    /// Route a received message.
    pub fn receive(&mut self, message: M) -> Routing {
        self.intercept(message, Direction::Inbound)
    }

    /// Release every held message matching `predicate`. Returns how many.
    pub fn flush<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(&MessageSnapshot<M>) -> bool,
    {
        let released = self.interceptor.flush(predicate);
        self.reinject(released)
    }

    pub fn flush_first(&mut self, count: usize) -> usize {
        let released = self.interceptor.flush_first(count);
        self.reinject(released)
    }

    /// Drop held movement, rewind local state and release the rest.
    /// Returns how many messages were released.
    pub fn cancel_all(&mut self) -> usize {
        let cancellation = self.interceptor.cancel_all();
        self.apply_cancellation(cancellation)
    }

    /// The transport went away: drop everything held without replay.
    pub fn connection_lost(&mut self) -> usize {
        let dropped = self.interceptor.clear();
        if dropped > 0 {
            warn!(session_id = %self.id, dropped, "connection lost, held messages discarded");
        }
        dropped
    }

    /// Continue on a fresh connection. Held messages and claims of the old
    /// session are dropped; the old connection is handed back.
    pub fn reconnect(&mut self, connection: C) -> C {
        self.connection_lost();
        self.arbiters.clear();
        self.tick = 0;

        let previous = self.id.clone();
        self.id = nanoid::nanoid!();
        info!(previous = %previous, session_id = %self.id, "session reconnected");

        std::mem::replace(&mut self.connection, connection)
    }

    fn poll(&mut self, direction: Direction, report: &mut TickReport) {
        let now = self.clock.now_ms();
        let open = self.connection.is_open();

        match self.interceptor.poll(direction, now, open) {
            Poll::Idle => {}
            Poll::Released(released) => report.released += self.reinject(released),
            Poll::Discarded(dropped) => report.discarded += dropped,
            Poll::Reset(cancellation) => {
                report.released += self.apply_cancellation(cancellation);
            }
        }
    }

    fn apply_cancellation(&mut self, cancellation: Cancellation<M>) -> usize {
        if let Some(position) = cancellation.rewind_to {
            self.connection.reset_position(position);
        }
        debug!(
            session_id = %self.id,
            discarded = cancellation.discarded,
            released = cancellation.released.len(),
            "held state cancelled"
        );
        self.reinject(cancellation.released)
    }

    fn reinject(&mut self, released: Vec<MessageSnapshot<M>>) -> usize {
        let count = released.len();
        for snapshot in released {
            self.dispatch(snapshot.direction, snapshot.payload);
        }
        count
    }

    fn dispatch(&mut self, direction: Direction, message: M) {
        match direction {
            Direction::Outbound => self.connection.send_silently(message),
            Direction::Inbound => self.connection.handle_inbound(message),
        }
    }
}
