use crate::decision::{Decision, DecisionContext};
use crate::types::{Message, MessageKind, MessageSnapshot, Position};

/// Minimal protocol message for tests.
#[derive(Debug, Clone, PartialEq)]
pub struct TestMessage {
    pub id: &'static str,
    pub kind: MessageKind,
    pub position: Option<Position>,
}

impl TestMessage {
    pub fn ordinary(id: &'static str) -> Self {
        Self {
            id,
            kind: MessageKind::Ordinary,
            position: None,
        }
    }

    pub fn movement(id: &'static str, x: f64) -> Self {
        Self {
            id,
            kind: MessageKind::Movement,
            position: Some(Position::new(x, 64.0, 0.0)),
        }
    }

    /// Movement that only turns the head.
    pub fn look(id: &'static str) -> Self {
        Self {
            id,
            kind: MessageKind::Movement,
            position: None,
        }
    }

    pub fn of_kind(id: &'static str, kind: MessageKind) -> Self {
        Self {
            id,
            kind,
            position: None,
        }
    }
}

impl Message for TestMessage {
    fn kind(&self) -> MessageKind {
        self.kind
    }

    fn position(&self) -> Option<Position> {
        self.position
    }
}

pub fn ids(snapshots: &[MessageSnapshot<TestMessage>]) -> Vec<&'static str> {
    snapshots.iter().map(|snapshot| snapshot.payload.id).collect()
}

/// A decider that always returns `decision`.
pub fn vote(
    decision: Option<Decision>,
) -> impl Fn(&DecisionContext<'_, TestMessage>) -> Option<Decision> + 'static {
    move |_| decision
}
