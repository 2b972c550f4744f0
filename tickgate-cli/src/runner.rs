use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use tickgate_core::config::SessionConfig;
use tickgate_core::infrastructure::Clock;
use tickgate_core::infrastructure_in_memory::{Delivery, ManualClock, RecordingConnection};
use tickgate_core::resources::{Aim, EquipmentSlot, Resource, ResourceId, TimeDilation};
use tickgate_core::session::{Routing, Session};
use tickgate_core::types::{Direction, Millis, OwnerId, Position, Priority, Ticks};

use crate::script::{Script, ScriptError, ScriptMessage, Step};

// ─── Trace ──────────────────────────────────────────────────────────────────

/// Something observable that happened while replaying a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Transmitted to the peer
    Sent { tick: u64, at: Millis, id: String },
    /// Handed to the client's inbound handling
    Handled { tick: u64, at: Millis, id: String },
    /// Local position rewound
    Reset { tick: u64, at: Millis, position: Position },
    Held {
        tick: u64,
        at: Millis,
        id: String,
        direction: Direction,
    },
    Tick {
        tick: u64,
        evicted: usize,
        released: usize,
        discarded: usize,
    },
    Query {
        tick: u64,
        resource: ResourceId,
        owner: Option<OwnerId>,
        value: Option<serde_json::Value>,
    },
}

#[derive(Debug, Serialize)]
pub struct Trace {
    pub session_id: String,
    pub ticks: u64,
    /// Messages still held when the scenario ended
    pub held: usize,
    pub events: Vec<TraceEvent>,
}

// ─── Runner ─────────────────────────────────────────────────────────────────

type ReplaySession = Session<ScriptMessage, RecordingConnection<ScriptMessage>>;

/// Drives a session through scenario steps on a manual clock.
pub struct Runner {
    session: ReplaySession,
    clock: ManualClock,
    events: Vec<TraceEvent>,
}

impl Runner {
    pub fn new(config: SessionConfig, start_ms: Millis) -> Self {
        let clock = ManualClock::new(start_ms);
        let session = Session::with_clock(RecordingConnection::new(), config, clock.clone());
        Self {
            session,
            clock,
            events: Vec::new(),
        }
    }

    pub fn replay(script: &Script, config_override: Option<SessionConfig>) -> Result<Trace, ScriptError> {
        let config = config_override
            .or_else(|| script.config.clone())
            .unwrap_or_default();
        let mut runner = Runner::new(config, script.start_ms);
        for (index, step) in script.steps.iter().enumerate() {
            runner.apply(index, step)?;
        }
        Ok(runner.finish())
    }

    pub fn apply(&mut self, index: usize, step: &Step) -> Result<(), ScriptError> {
        debug!(step = index, op = step.name(), "replaying step");

        match step {
            Step::Submit {
                resource,
                owner,
                value,
                priority,
                ttl,
            } => {
                let Some(id) = self.resource(index, resource) else {
                    return Ok(());
                };
                let ttl = ttl.unwrap_or(self.session.config().default_ttl);
                let value = value.clone();
                match id {
                    ResourceId::Aim => self.submit::<Aim>(index, owner, value, *priority, ttl)?,
                    ResourceId::TimeDilation => self.submit::<TimeDilation>(index, owner, value, *priority, ttl)?,
                    ResourceId::EquipmentSlot => self.submit::<EquipmentSlot>(index, owner, value, *priority, ttl)?,
                }
            }
            Step::Release { resource, owner } => {
                if let Some(id) = self.resource(index, resource) {
                    self.session.arbiters_mut().release_by_id(id, owner);
                }
            }
            Step::Retire { owner } => self.session.retire(owner),
            Step::Hold {
                owner,
                priority,
                strategy,
            } => self.session.register_decider(owner, *priority, *strategy),
            Step::Tick => {
                let report = self.session.tick();
                self.collect();
                self.events.push(TraceEvent::Tick {
                    tick: report.tick,
                    evicted: report.evicted,
                    released: report.released,
                    discarded: report.discarded,
                });
            }
            Step::Advance { ms } => self.clock.advance(*ms),
            Step::Send { message } => self.route(message.clone(), Direction::Outbound),
            Step::Receive { message } => self.route(message.clone(), Direction::Inbound),
            Step::ProcessInbound => {
                self.session.process_inbound();
            }
            Step::Flush { direction, ids } => {
                self.session.flush(|snapshot| {
                    direction.is_none_or(|d| snapshot.direction == d)
                        && (ids.is_empty() || ids.contains(&snapshot.payload.id))
                });
            }
            Step::FlushFirst { count } => {
                self.session.flush_first(*count);
            }
            Step::CancelAll => {
                self.session.cancel_all();
            }
            Step::Disconnect => self.session.connection_mut().close(),
            Step::Reconnect => {
                self.collect();
                self.session.reconnect(RecordingConnection::new());
            }
            Step::Query { resource } => {
                if let Some(id) = self.resource(index, resource) {
                    let event = match id {
                        ResourceId::Aim => self.query::<Aim>()?,
                        ResourceId::TimeDilation => self.query::<TimeDilation>()?,
                        ResourceId::EquipmentSlot => self.query::<EquipmentSlot>()?,
                    };
                    self.collect();
                    self.events.push(event);
                }
            }
        }

        self.collect();
        Ok(())
    }

    pub fn finish(mut self) -> Trace {
        self.collect();
        Trace {
            session_id: self.session.id().to_string(),
            ticks: self.session.current_tick(),
            held: self.session.interceptor().buffer().len(),
            events: self.events,
        }
    }

    fn resource(&self, index: usize, name: &str) -> Option<ResourceId> {
        let id = ResourceId::parse(name);
        if id.is_none() {
            warn!(step = index, resource = name, "unknown resource, step ignored");
        }
        id
    }

    fn submit<R>(
        &mut self,
        index: usize,
        owner: &OwnerId,
        value: serde_json::Value,
        priority: Priority,
        ttl: Ticks,
    ) -> Result<(), ScriptError>
    where
        R: Resource,
        R::Value: DeserializeOwned,
    {
        let value: R::Value = serde_json::from_value(value).map_err(|source| ScriptError::Value {
            step: index,
            resource: R::ID,
            source,
        })?;
        self.session.arbiters_mut().submit::<R>(owner, value, priority, ttl);
        Ok(())
    }

    fn query<R>(&self) -> Result<TraceEvent, ScriptError>
    where
        R: Resource,
        R::Value: Serialize,
    {
        let arbiter = self.session.arbiters().get::<R>();
        let value = arbiter.current_value().map(serde_json::to_value).transpose()?;
        Ok(TraceEvent::Query {
            tick: self.session.current_tick(),
            resource: R::ID,
            owner: arbiter.current_owner().cloned(),
            value,
        })
    }

    fn route(&mut self, message: ScriptMessage, direction: Direction) {
        let id = message.id.clone();
        if self.session.intercept(message, direction) == Routing::Held {
            self.collect();
            self.events.push(TraceEvent::Held {
                tick: self.session.current_tick(),
                at: self.now(),
                id,
                direction,
            });
        }
    }

    /// Move deliveries recorded by the connection into the trace.
    fn collect(&mut self) {
        let tick = self.session.current_tick();
        let at = self.now();
        for delivery in self.session.connection_mut().take_deliveries() {
            self.events.push(match delivery {
                Delivery::Sent(message) => TraceEvent::Sent { tick, at, id: message.id },
                Delivery::Handled(message) => TraceEvent::Handled { tick, at, id: message.id },
                Delivery::Reset(position) => TraceEvent::Reset { tick, at, position },
            });
        }
    }

    fn now(&self) -> Millis {
        self.clock.now_ms()
    }
}
