use crate::decision::HoldStrategy;
use crate::types::{OwnerId, Priority, Ticks};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// What to do once too many positions are held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetAction {
    /// Drop held movement and put the client back at the first held position
    Rewind,
    /// Send everything held outbound
    Release,
}

/// Checked on the outbound poll at the start of each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoReset {
    /// Reset once more than this many positions are held
    pub after_positions: usize,
    pub action: ResetAction,
}

/// A hold strategy registered when the session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldRule {
    pub owner: OwnerId,
    #[serde(default)]
    pub priority: Priority,
    pub strategy: HoldStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// TTL used for requests that do not name one
    pub default_ttl: Ticks,
    pub auto_reset: Option<AutoReset>,
    pub hold: Vec<HoldRule>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_ttl: 1,
            auto_reset: None,
            hold: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("auto_reset.after_positions must be greater than 0")]
    ZeroResetThreshold,
    #[error("hold strategy for `{0}` must hold for more than 0 ms")]
    ZeroHold(OwnerId),
    #[error("owner `{0}` has more than one hold strategy")]
    DuplicateOwner(OwnerId),
}

impl SessionConfig {
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(reset) = &self.auto_reset {
            if reset.after_positions == 0 {
                return Err(ConfigError::ZeroResetThreshold);
            }
        }

        let mut owners = HashSet::new();
        for rule in &self.hold {
            if !owners.insert(&rule.owner) {
                return Err(ConfigError::DuplicateOwner(rule.owner.clone()));
            }
            if let HoldStrategy::Delay { hold_ms: 0, .. } = rule.strategy {
                return Err(ConfigError::ZeroHold(rule.owner.clone()));
            }
        }

        Ok(())
    }
}
