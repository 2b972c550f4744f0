#[cfg(test)]
mod tests {
    use crate::config::{AutoReset, ConfigError, ResetAction, SessionConfig};
    use crate::decision::HoldStrategy;
    use crate::types::{Direction, OwnerId, Priority};

    #[test]
    fn empty_object_gives_defaults() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.default_ttl, 1);
        assert!(config.auto_reset.is_none());
    }

    #[test]
    fn full_config_parses() {
        let config = SessionConfig::from_json(
            r#"{
                "default_ttl": 3,
                "auto_reset": { "after_positions": 20, "action": "rewind" },
                "hold": [
                    { "owner": "blink", "strategy": { "mode": "blink", "direction": "outbound" } },
                    { "owner": "lag", "priority": 10, "strategy": { "mode": "delay", "direction": "inbound", "hold_ms": 250 } }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.default_ttl, 3);
        assert_eq!(
            config.auto_reset,
            Some(AutoReset {
                after_positions: 20,
                action: ResetAction::Rewind,
            })
        );
        assert_eq!(config.hold.len(), 2);
        assert_eq!(config.hold[0].priority, Priority::NORMAL);
        assert_eq!(config.hold[1].owner, OwnerId::from("lag"));
        assert_eq!(config.hold[1].priority, Priority::IMPORTANT_FOR_USAGE_1);
        assert_eq!(
            config.hold[1].strategy,
            HoldStrategy::Delay {
                direction: Direction::Inbound,
                hold_ms: 250,
            }
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = SessionConfig::from_json(r#"{ "default_tll": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_reset_threshold_is_rejected() {
        let err = SessionConfig::from_json(r#"{ "auto_reset": { "after_positions": 0, "action": "release" } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroResetThreshold));
    }

    #[test]
    fn zero_delay_is_rejected() {
        let err = SessionConfig::from_json(
            r#"{ "hold": [ { "owner": "lag", "strategy": { "mode": "delay", "direction": "outbound", "hold_ms": 0 } } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroHold(owner) if owner.as_str() == "lag"));
    }

    #[test]
    fn duplicate_owner_is_rejected() {
        let err = SessionConfig::from_json(
            r#"{ "hold": [
                { "owner": "blink", "strategy": { "mode": "blink", "direction": "outbound" } },
                { "owner": "blink", "strategy": { "mode": "blink", "direction": "inbound" } }
            ] }"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "owner `blink` has more than one hold strategy");
    }
}
