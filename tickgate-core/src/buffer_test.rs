#[cfg(test)]
mod tests {
    use crate::buffer::TransitBuffer;
    use crate::test_support::{TestMessage, ids};
    use crate::types::{Direction, MessageKind, Position};

    // =========================================================================
    // Helper
    // =========================================================================
    fn buffer_of(messages: &[(TestMessage, Direction)]) -> TransitBuffer<TestMessage> {
        let mut buffer = TransitBuffer::new();
        for (at, (message, direction)) in messages.iter().enumerate() {
            buffer.hold(message.clone(), *direction, at as u64 * 10);
        }
        buffer
    }

    fn remaining(buffer: &TransitBuffer<TestMessage>) -> Vec<&'static str> {
        buffer.iter().map(|snapshot| snapshot.payload.id).collect()
    }

    // =========================================================================
    // flush(predicate)
    // =========================================================================

    #[test]
    fn flush_single_middle_message_keeps_neighbours_in_order() {
        let mut buffer = buffer_of(&[
            (TestMessage::ordinary("M1"), Direction::Outbound),
            (TestMessage::ordinary("M2"), Direction::Outbound),
            (TestMessage::ordinary("M3"), Direction::Outbound),
        ]);

        let released = buffer.flush(|snapshot| snapshot.payload.id == "M2");

        assert_eq!(ids(&released), vec!["M2"]);
        assert_eq!(remaining(&buffer), vec!["M1", "M3"]);
    }

    #[test]
    fn flush_non_contiguous_subset_is_a_stable_partition() {
        let mut buffer = buffer_of(&[
            (TestMessage::ordinary("a1"), Direction::Outbound),
            (TestMessage::ordinary("b1"), Direction::Inbound),
            (TestMessage::ordinary("a2"), Direction::Outbound),
            (TestMessage::ordinary("b2"), Direction::Inbound),
            (TestMessage::ordinary("a3"), Direction::Outbound),
            (TestMessage::ordinary("b3"), Direction::Inbound),
        ]);

        let released = buffer.flush(|snapshot| snapshot.payload.id != "a2" && snapshot.payload.id != "b2");

        assert_eq!(ids(&released), vec!["a1", "b1", "a3", "b3"]);
        assert_eq!(remaining(&buffer), vec!["a2", "b2"]);
    }

    #[test]
    fn flush_matching_nothing_or_everything() {
        let mut buffer = buffer_of(&[
            (TestMessage::ordinary("M1"), Direction::Outbound),
            (TestMessage::ordinary("M2"), Direction::Inbound),
        ]);

        assert!(buffer.flush(|_| false).is_empty());
        assert_eq!(buffer.len(), 2);

        assert_eq!(ids(&buffer.flush(|_| true)), vec!["M1", "M2"]);
        assert!(buffer.is_empty());
        assert!(buffer.flush(|_| true).is_empty());
    }

    #[test]
    fn flush_direction_leaves_the_other_direction_alone() {
        let mut buffer = buffer_of(&[
            (TestMessage::ordinary("out1"), Direction::Outbound),
            (TestMessage::ordinary("in1"), Direction::Inbound),
            (TestMessage::ordinary("out2"), Direction::Outbound),
        ]);

        assert_eq!(ids(&buffer.flush_direction(Direction::Outbound)), vec!["out1", "out2"]);
        assert_eq!(remaining(&buffer), vec!["in1"]);
        assert_eq!(buffer.len_in(Direction::Inbound), 1);
        assert_eq!(buffer.len_in(Direction::Outbound), 0);
    }

    // =========================================================================
    // flush_first(n)
    // =========================================================================

    #[test]
    fn flush_first_stops_after_the_nth_marker() {
        let mut buffer = buffer_of(&[
            (TestMessage::ordinary("swing"), Direction::Outbound),
            (TestMessage::movement("step1", 1.0), Direction::Outbound),
            (TestMessage::ordinary("velocity"), Direction::Inbound),
            (TestMessage::look("look"), Direction::Outbound),
            (TestMessage::movement("step2", 2.0), Direction::Outbound),
            (TestMessage::movement("step3", 3.0), Direction::Outbound),
        ]);

        let released = buffer.flush_first(2);

        assert_eq!(ids(&released), vec!["swing", "step1", "velocity", "look", "step2"]);
        assert_eq!(remaining(&buffer), vec!["step3"]);
    }

    #[test]
    fn flush_first_with_too_few_markers_equals_flush_all() {
        let messages = [
            (TestMessage::movement("step1", 1.0), Direction::Outbound),
            (TestMessage::ordinary("chat-ish"), Direction::Inbound),
            (TestMessage::ordinary("use"), Direction::Outbound),
        ];
        let mut first = buffer_of(&messages);
        let mut all = buffer_of(&messages);

        assert_eq!(first.flush_first(5), all.flush(|_| true));
        assert!(first.is_empty());
    }

    #[test]
    fn flush_first_zero_releases_nothing() {
        let mut buffer = buffer_of(&[(TestMessage::movement("step1", 1.0), Direction::Outbound)]);
        assert!(buffer.flush_first(0).is_empty());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn inbound_positions_are_not_causal_markers() {
        let mut buffer = buffer_of(&[
            (TestMessage::movement("entity-move", 9.0), Direction::Inbound),
            (TestMessage::movement("step1", 1.0), Direction::Outbound),
            (TestMessage::ordinary("tail"), Direction::Outbound),
        ]);

        assert_eq!(ids(&buffer.flush_first(1)), vec!["entity-move", "step1"]);
        assert_eq!(remaining(&buffer), vec!["tail"]);
    }

    // =========================================================================
    // cancel_all / clear
    // =========================================================================

    #[test]
    fn cancel_all_drops_movement_and_rewinds_to_first_position() {
        let mut buffer = buffer_of(&[
            (TestMessage::movement("step1", 1.0), Direction::Outbound),
            (TestMessage::ordinary("swing"), Direction::Outbound),
            (TestMessage::look("look"), Direction::Outbound),
            (TestMessage::movement("step2", 2.0), Direction::Outbound),
            (TestMessage::ordinary("velocity"), Direction::Inbound),
        ]);

        let cancellation = buffer.cancel_all();

        assert_eq!(cancellation.rewind_to, Some(Position::new(1.0, 64.0, 0.0)));
        assert_eq!(ids(&cancellation.released), vec!["swing", "velocity"]);
        assert_eq!(cancellation.discarded, 3);
        assert!(buffer.is_empty());
    }

    #[test]
    fn cancel_all_twice_is_the_same_as_once() {
        let mut buffer = buffer_of(&[
            (TestMessage::movement("step1", 1.0), Direction::Outbound),
            (TestMessage::ordinary("swing"), Direction::Outbound),
        ]);

        let first = buffer.cancel_all();
        let second = buffer.cancel_all();

        assert_eq!(first.released.len(), 1);
        assert_eq!(second.rewind_to, None);
        assert!(second.released.is_empty());
        assert_eq!(second.discarded, 0);
    }

    #[test]
    fn clear_drops_without_release() {
        let mut buffer = buffer_of(&[
            (TestMessage::ordinary("M1"), Direction::Outbound),
            (TestMessage::ordinary("M2"), Direction::Inbound),
        ]);

        assert_eq!(buffer.clear(), 2);
        assert!(!buffer.is_holding());
        assert_eq!(buffer.clear(), 0);
    }

    // =========================================================================
    // Inspection helpers
    // =========================================================================

    #[test]
    fn positions_lists_outbound_positions_oldest_first() {
        let buffer = buffer_of(&[
            (TestMessage::movement("step1", 1.0), Direction::Outbound),
            (TestMessage::movement("entity", 7.0), Direction::Inbound),
            (TestMessage::look("look"), Direction::Outbound),
            (TestMessage::movement("step2", 2.0), Direction::Outbound),
        ]);

        let xs: Vec<f64> = buffer.positions().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 2.0]);
    }

    #[test]
    fn is_above_time_measures_the_oldest_snapshot() {
        let mut buffer = TransitBuffer::new();
        assert!(!buffer.is_above_time(0, 1_000));

        buffer.hold(TestMessage::ordinary("M1"), Direction::Outbound, 1_000);
        buffer.hold(TestMessage::ordinary("M2"), Direction::Outbound, 1_200);

        assert!(!buffer.is_above_time(300, 1_250));
        assert!(buffer.is_above_time(300, 1_300));
        assert_eq!(buffer.oldest_arrival(Some(Direction::Inbound)), None);
        assert_eq!(buffer.oldest_arrival(Some(Direction::Outbound)), Some(1_000));
    }

    #[test]
    fn rewrite_touches_only_the_requested_direction() {
        let mut buffer = buffer_of(&[
            (TestMessage::ordinary("out"), Direction::Outbound),
            (TestMessage::ordinary("in"), Direction::Inbound),
        ]);

        buffer.rewrite(Direction::Outbound, |message| message.kind = MessageKind::Movement);

        let kinds: Vec<MessageKind> = buffer.iter().map(|s| s.payload.kind).collect();
        assert_eq!(kinds, vec![MessageKind::Movement, MessageKind::Ordinary]);
    }
}
