//! Declarative configuration for live sources.
//!
//! Screens that build many live sources usually keep their wiring in a
//! settings file. [`LiveSourceConfig`] is the serializable part of a live
//! source's setup:
//!
//! ```toml
//! section_offset = 1
//! reuse_identifier = "contact"
//! section_key_path = "last_name_initial"
//! cache_name = "contacts"
//! animation = "fade"
//! ```

use serde::{Deserialize, Serialize};

use super::traits::RowAnimation;

/// The reuse identifier used when none is configured.
pub const DEFAULT_REUSE_IDENTIFIER: &str = "reuseIdentifier";

/// Error returned when a configuration cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("Invalid live source configuration: {0}")]
pub struct ConfigError(#[from] toml::de::Error);

/// Serializable settings for a [`LiveSource`](super::LiveSource).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiveSourceConfig {
    /// Combined index of the source's first section.
    pub section_offset: usize,
    /// Reuse identifier for every cell the source dequeues.
    pub reuse_identifier: String,
    /// Key path that groups elements into sections.
    pub section_key_path: Option<String>,
    /// Cache name passed through to the store.
    pub cache_name: Option<String>,
    /// Animation for structural changes.
    pub animation: RowAnimation,
}

impl Default for LiveSourceConfig {
    fn default() -> Self {
        Self {
            section_offset: 0,
            reuse_identifier: DEFAULT_REUSE_IDENTIFIER.to_string(),
            section_key_path: None,
            cache_name: None,
            animation: RowAnimation::default(),
        }
    }
}

impl LiveSourceConfig {
    /// Parses a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}
