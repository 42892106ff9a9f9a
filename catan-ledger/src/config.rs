use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_AUDIT_CAPACITY;

/// What batch processing does after a resolved steal leaves a negative holding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatalPolicy {
    /// Record the failure in the audit trail and keep going.
    #[default]
    Continue,
    /// Stop the batch at the offending record.
    Halt,
}

/// Tracker settings. Every field has a default so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "TrackerConfig::default_audit_capacity")]
    pub audit_capacity: usize,
    /// Preferred name for the "you" token.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub fatal_policy: FatalPolicy,
    /// Show debug notes in the audit trail.
    #[serde(default = "TrackerConfig::default_debug_mode")]
    pub debug_mode: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            audit_capacity: Self::default_audit_capacity(),
            username: None,
            fatal_policy: FatalPolicy::default(),
            debug_mode: Self::default_debug_mode(),
        }
    }
}

impl TrackerConfig {
    #[must_use]
    pub const fn default_audit_capacity() -> usize {
        DEFAULT_AUDIT_CAPACITY
    }

    #[must_use]
    pub const fn default_debug_mode() -> bool {
        true
    }

    /// Parse a JSON configuration and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the validation
    /// error for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates its bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audit_capacity < 1 {
            return Err(ConfigError::MinViolation {
                field: "audit_capacity",
                min: 1,
                value: self.audit_capacity,
            });
        }
        if self
            .username
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(ConfigError::BlankUsername);
        }
        Ok(())
    }
}

/// Errors raised when tracker configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: usize,
        value: usize,
    },
    #[error("username must not be blank")]
    BlankUsername,
    #[error("invalid tracker configuration: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TrackerConfig::default();
        assert_eq!(config.audit_capacity, 100);
        assert_eq!(config.fatal_policy, FatalPolicy::Continue);
        assert!(config.debug_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = TrackerConfig::from_json(r#"{"username":"Alice","fatal_policy":"halt"}"#)
            .unwrap();
        assert_eq!(config.username.as_deref(), Some("Alice"));
        assert_eq!(config.fatal_policy, FatalPolicy::Halt);
        assert_eq!(config.audit_capacity, 100);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            TrackerConfig::from_json(r#"{"audit_capacity":0}"#),
            Err(ConfigError::MinViolation {
                field: "audit_capacity",
                min: 1,
                value: 0
            })
        );
        let blank = TrackerConfig {
            username: Some(String::from("  ")),
            ..TrackerConfig::default()
        };
        assert_eq!(blank.validate(), Err(ConfigError::BlankUsername));
        assert!(matches!(
            TrackerConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
