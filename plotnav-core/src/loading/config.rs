use serde::{Deserialize, Serialize};

use crate::{Error, Meters, model::QuantizedKey};

/// Graph construction settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum gap bridged by endpoint and mid-segment snapping
    pub snap_tolerance_m: Meters,
    /// Decimal places kept when deduplicating coordinates
    pub quantization_decimals: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            snap_tolerance_m: 4.0,
            quantization_decimals: QuantizedKey::DEFAULT_DECIMALS,
        }
    }
}

impl GraphConfig {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a negative or non-finite tolerance,
    /// or a precision too fine to fit the quantization key
    pub fn validate(&self) -> Result<(), Error> {
        if !self.snap_tolerance_m.is_finite() || self.snap_tolerance_m < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "snap_tolerance_m must be a non-negative number, got {}",
                self.snap_tolerance_m
            )));
        }
        if self.quantization_decimals > 9 {
            return Err(Error::InvalidConfig(format!(
                "quantization_decimals must be at most 9, got {}",
                self.quantization_decimals
            )));
        }
        Ok(())
    }
}
