//! Participant configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("resource kind must not be empty")]
    EmptyKind,
}

/// Participant configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantConfig {
    /// Resource kind; participants of the same kind share one branch table.
    pub kind: String,
    /// Reject Xids over the XA size limits when a branch is started.
    pub strict_xid_limits: bool,
    /// Close and drop a branch as soon as it votes read-only.
    pub release_read_only: bool,
}

impl Default for ParticipantConfig {
    fn default() -> Self {
        Self {
            kind: "default".to_string(),
            strict_xid_limits: true,
            release_read_only: true,
        }
    }
}

impl ParticipantConfig {
    /// Create a new configuration for the given kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kind.trim().is_empty() {
            return Err(ConfigError::EmptyKind);
        }
        Ok(())
    }

    /// Set strict_xid_limits flag.
    pub fn strict_xid_limits(mut self, value: bool) -> Self {
        self.strict_xid_limits = value;
        self
    }

    /// Set release_read_only flag.
    pub fn release_read_only(mut self, value: bool) -> Self {
        self.release_read_only = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParticipantConfig::new("jdbc");
        assert_eq!(config.kind, "jdbc");
        assert!(config.strict_xid_limits);
        assert!(config.release_read_only);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ParticipantConfig::from_json(r#"{"kind": "cql", "release_read_only": false}"#)
            .unwrap();
        assert_eq!(config.kind, "cql");
        assert!(config.strict_xid_limits);
        assert!(!config.release_read_only);
    }

    #[test]
    fn test_from_json_rejects() {
        assert!(matches!(
            ParticipantConfig::from_json(r#"{"kind": "  "}"#),
            Err(ConfigError::EmptyKind)
        ));
        assert!(matches!(
            ParticipantConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_builder() {
        let config = ParticipantConfig::new("buf")
            .strict_xid_limits(false)
            .release_read_only(false);
        assert!(!config.strict_xid_limits);
        assert!(!config.release_read_only);
    }
}
