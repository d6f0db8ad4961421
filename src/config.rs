//! Tracker configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! template_size = 5
//! die_sides = 20
//! pulse_duration_ms = 500
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::roster::{DEFAULT_DIE_SIDES, DEFAULT_TEMPLATE_SIZE};

/// Length of the highlight shown after the round counter is reset.
pub const DEFAULT_PULSE_DURATION_MS: u64 = 500;

/// Upper bound on the blank template.
pub const MAX_TEMPLATE_SIZE: usize = 100;

/// Largest die the tracker will roll for initiative.
pub const MAX_DIE_SIDES: u32 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Blank rows at start and after a clear
    pub template_size: usize,

    /// Sides of the initiative die
    pub die_sides: u32,

    pub pulse_duration_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            template_size: DEFAULT_TEMPLATE_SIZE,
            die_sides: DEFAULT_DIE_SIDES,
            pulse_duration_ms: DEFAULT_PULSE_DURATION_MS,
        }
    }
}

impl TrackerConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.template_size > MAX_TEMPLATE_SIZE {
            return Err(ConfigError::Invalid("template_size exceeds 100 rows"));
        }
        if !(2..=MAX_DIE_SIDES).contains(&self.die_sides) {
            return Err(ConfigError::Invalid("die_sides must be between 2 and 1000"));
        }
        if self.pulse_duration_ms == 0 {
            return Err(ConfigError::Invalid("pulse_duration_ms must be non-zero"));
        }
        Ok(())
    }

    pub fn pulse_duration(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.pulse_duration_ms).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_is_default() {
        let config = TrackerConfig::from_toml_str("").unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.template_size, 5);
        assert_eq!(config.die_sides, 20);
    }

    #[test]
    fn test_partial_override() {
        let config = TrackerConfig::from_toml_str("template_size = 8\n").unwrap();
        assert_eq!(config.template_size, 8);
        assert_eq!(config.die_sides, 20);
        assert_eq!(config.pulse_duration(), chrono::Duration::milliseconds(500));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            TrackerConfig::from_toml_str("die_sides = 1"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            TrackerConfig::from_toml_str("die_sides = 5000"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            TrackerConfig::from_toml_str("template_size = 500"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            TrackerConfig::from_toml_str("pulse_duration_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            TrackerConfig::from_toml_str("template_size = \"five\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            TrackerConfig::from_file("/nonexistent/tracker.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
