//! # Validator Configuration
//!
//! Deployment-level knobs for the validation core, loaded once at start-up
//! alongside registry initialization. Missing keys fall back to defaults, so
//! an empty document yields the standard behavior: every built-in kind
//! registered and timestamps accepted in any RFC 3339 offset.
//!
//! ```yaml
//! timestamp_profile: utc-only
//! kinds:
//!   - build-record
//! ```

use attest_core::KindId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which RFC 3339 date-times the timestamp checker accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimestampProfile {
    /// Any explicit offset (`Z`, `+05:30`, `-04:00`).
    #[default]
    Rfc3339,
    /// Only the `Z` suffix.
    UtcOnly,
}

/// Configuration for the standard registry and its builders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Timestamp parsing profile applied by every builder.
    pub timestamp_profile: TimestampProfile,
    /// Kinds to register. `None` registers every built-in kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<KindId>>,
}

/// Error loading a [`ValidatorConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document is not valid YAML for this schema.
    #[error("invalid validator configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ValidatorConfig {
    /// Parse a configuration document.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(s)?)
    }

    /// Whether `kind` should be registered under this configuration.
    pub fn enables(&self, kind: &KindId) -> bool {
        match &self.kinds {
            None => true,
            Some(kinds) => kinds.contains(kind),
        }
    }
}
