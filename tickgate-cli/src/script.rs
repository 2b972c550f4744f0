use serde::{Deserialize, Serialize};
use thiserror::Error;

use tickgate_core::config::{ConfigError, SessionConfig};
use tickgate_core::decision::HoldStrategy;
use tickgate_core::resources::ResourceId;
use tickgate_core::types::{Direction, Message, MessageKind, Millis, OwnerId, Position, Priority, Ticks};

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("step {step}: value does not fit resource `{resource}`: {source}")]
    Value {
        step: usize,
        resource: ResourceId,
        #[source]
        source: serde_json::Error,
    },
}

// ─── Scenario Format ────────────────────────────────────────────────────────

/// A replayable scenario: an optional session config plus a list of steps.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub config: Option<SessionConfig>,
    /// Clock reading when the session opens
    #[serde(default)]
    pub start_ms: Millis,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(input: &str) -> Result<Self, ScriptError> {
        let script: Script = serde_json::from_str(input)?;
        if let Some(config) = &script.config {
            config.validate()?;
        }
        Ok(script)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Claim a resource. `ttl` falls back to the config's `default_ttl`.
    Submit {
        resource: String,
        owner: OwnerId,
        value: serde_json::Value,
        #[serde(default)]
        priority: Priority,
        #[serde(default)]
        ttl: Option<Ticks>,
    },
    Release {
        resource: String,
        owner: OwnerId,
    },
    /// The owner's module stopped: drop its claims and its hold strategy.
    Retire {
        owner: OwnerId,
    },
    /// Register a hold strategy mid-session.
    Hold {
        owner: OwnerId,
        #[serde(default)]
        priority: Priority,
        strategy: HoldStrategy,
    },
    Tick,
    Advance {
        ms: Millis,
    },
    Send {
        message: ScriptMessage,
    },
    Receive {
        message: ScriptMessage,
    },
    ProcessInbound,
    /// Release held messages. Without filters everything is released.
    Flush {
        #[serde(default)]
        direction: Option<Direction>,
        #[serde(default)]
        ids: Vec<String>,
    },
    FlushFirst {
        count: usize,
    },
    CancelAll,
    /// The transport closes; the next poll discards what is held.
    Disconnect,
    /// Continue on a fresh transport.
    Reconnect,
    Query {
        resource: String,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Submit { .. } => "submit",
            Step::Release { .. } => "release",
            Step::Retire { .. } => "retire",
            Step::Hold { .. } => "hold",
            Step::Tick => "tick",
            Step::Advance { .. } => "advance",
            Step::Send { .. } => "send",
            Step::Receive { .. } => "receive",
            Step::ProcessInbound => "process_inbound",
            Step::Flush { .. } => "flush",
            Step::FlushFirst { .. } => "flush_first",
            Step::CancelAll => "cancel_all",
            Step::Disconnect => "disconnect",
            Step::Reconnect => "reconnect",
            Step::Query { .. } => "query",
        }
    }
}

/// A protocol message as written in a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptMessage {
    pub id: String,
    #[serde(default = "ordinary")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

fn ordinary() -> MessageKind {
    MessageKind::Ordinary
}

impl Message for ScriptMessage {
    fn kind(&self) -> MessageKind {
        self.kind
    }

    fn position(&self) -> Option<Position> {
        self.position
    }
}
