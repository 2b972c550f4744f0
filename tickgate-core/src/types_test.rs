#[cfg(test)]
mod tests {
    use crate::test_support::TestMessage;
    use crate::types::{Direction, MessageSnapshot, Priority};

    #[test]
    fn opposite_direction_round_trips() {
        assert_eq!(Direction::Inbound.opposite(), Direction::Outbound);
        assert_eq!(Direction::Outbound.opposite(), Direction::Inbound);
        assert_eq!(Direction::Inbound.opposite().opposite(), Direction::Inbound);
    }

    #[test]
    fn named_priorities_are_ordered() {
        assert!(Priority::IMPORTANT_FOR_USER_SAFETY > Priority::IMPORTANT_FOR_PLAYER_LIFE);
        assert!(Priority::IMPORTANT_FOR_PLAYER_LIFE > Priority::IMPORTANT_FOR_USAGE_3);
        assert!(Priority::NORMAL > Priority::NOT_IMPORTANT);
        assert_eq!(Priority::default(), Priority::NORMAL);
    }

    #[test]
    fn only_outbound_positions_are_causal_markers() {
        for direction in [Direction::Inbound, Direction::Outbound] {
            let step = MessageSnapshot::new(TestMessage::movement("step", 1.0), direction, 0);
            assert_eq!(step.is_causal_marker(), direction == Direction::Outbound);

            let mirrored = MessageSnapshot::new(TestMessage::movement("step", 1.0), direction.opposite(), 0);
            assert_ne!(step.is_causal_marker(), mirrored.is_causal_marker());
        }
    }
}
