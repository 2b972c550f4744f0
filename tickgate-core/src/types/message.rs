use serde::{Deserialize, Serialize};

use super::{Direction, Millis, Position};

/// Closed classification of protocol messages as far as buffering is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Any message that may be held
    Ordinary,
    /// A movement step; carries a position when it commits one
    Movement,
    Handshake,
    Ping,
    Chat,
    Command,
    /// Session housekeeping (resource pack status, settings, ...)
    Administrative,
    /// The peer overrides our position
    PositionCorrection,
    /// The peer closes the session
    Disconnect,
    /// Our own death notification
    Death,
}

impl MessageKind {
    /// Kinds the buffer may hold at all.
    pub fn is_bufferable(self) -> bool {
        matches!(self, MessageKind::Ordinary | MessageKind::Movement)
    }

    /// Kinds that release everything held in their direction before passing.
    pub fn forces_flush(self) -> bool {
        matches!(
            self,
            MessageKind::PositionCorrection | MessageKind::Disconnect | MessageKind::Death
        )
    }
}

/// What the buffer needs to know about an application message.
pub trait Message {
    fn kind(&self) -> MessageKind;

    /// The position this message commits to the peer, if any.
    fn position(&self) -> Option<Position> {
        None
    }
}

/// A held message, owned by the buffer until it is released or discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSnapshot<M> {
    pub payload: M,
    pub direction: Direction,
    pub arrived_at: Millis,
}

impl<M: Message> MessageSnapshot<M> {
    pub fn new(payload: M, direction: Direction, arrived_at: Millis) -> Self {
        Self {
            payload,
            direction,
            arrived_at,
        }
    }

    /// Outbound position the peer has not seen yet.
    pub fn committed_position(&self) -> Option<Position> {
        match self.direction {
            Direction::Outbound => self.payload.position(),
            Direction::Inbound => None,
        }
    }

    /// Counted by `flush_first`: an outbound message that commits a position.
    pub fn is_causal_marker(&self) -> bool {
        self.committed_position().is_some()
    }

    /// Outbound movement, dropped instead of sent when the buffer is cancelled.
    pub fn is_local_movement(&self) -> bool {
        self.direction == Direction::Outbound && self.payload.kind() == MessageKind::Movement
    }
}
