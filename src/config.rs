use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::Error;
use plotnav_core::{GraphConfig, navigation::NavigationConfig};

/// Engine settings as read from a TOML file.
///
/// Both tables are optional and every key inside them falls back to its
/// default:
///
/// ```toml
/// [graph]
/// snap_tolerance_m = 4.0
///
/// [navigation]
/// throttle_interval_ms = 1000
/// arrival_radius_m = 5.0
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub graph: GraphConfig,
    pub navigation: NavigationConfig,
}

impl EngineConfig {
    /// Parses and validates a TOML document
    ///
    /// # Errors
    ///
    /// Returns [`Error::Toml`] for malformed TOML or unknown value types and
    /// [`Error::Core`] for out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        debug!("Loaded engine config: {config:?}");
        Ok(config)
    }

    /// Reads and validates a TOML file
    ///
    /// # Errors
    ///
    /// As [`Self::from_toml_str`], plus [`Error::Io`] if the file cannot be
    /// read
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    ///
    /// Returns the first invalid value of either table
    pub fn validate(&self) -> Result<(), Error> {
        self.graph.validate()?;
        self.navigation.validate()?;
        Ok(())
    }
}
