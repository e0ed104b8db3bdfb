//! Position samples and the sources that produce them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Meters, model::Coordinate};

/// One fix from the host's position source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub coordinate: Coordinate,
    /// Reported horizontal accuracy
    pub accuracy_m: Meters,
    pub speed_mps: Option<f64>,
    /// GPS course over ground in degrees, meaningful only while moving
    pub heading_deg: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl PositionSample {
    pub fn new(coordinate: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            accuracy_m: 0.0,
            speed_mps: None,
            heading_deg: None,
            timestamp,
        }
    }

    #[must_use]
    pub fn with_accuracy(mut self, accuracy_m: Meters) -> Self {
        self.accuracy_m = accuracy_m;
        self
    }

    /// Sets speed and course over ground
    #[must_use]
    pub fn with_motion(mut self, speed_mps: f64, heading_deg: f64) -> Self {
        self.speed_mps = Some(speed_mps);
        self.heading_deg = Some(heading_deg);
        self
    }
}

/// Why the host could not produce a position
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionError {
    #[error("Location permission was denied")]
    PermissionDenied,
    #[error("Location information is unavailable")]
    Unavailable,
    #[error("Location request timed out")]
    Timeout,
}

/// Anything that can be asked for the current position
pub trait PositionSource {
    /// # Errors
    ///
    /// Returns the classified reason when no fix is available
    fn current_position(&mut self) -> Result<PositionSample, PositionError>;
}

/// A fixed sample always yields itself
impl PositionSource for PositionSample {
    fn current_position(&mut self) -> Result<PositionSample, PositionError> {
        Ok(*self)
    }
}

impl PositionSource for Result<PositionSample, PositionError> {
    fn current_position(&mut self) -> Result<PositionSample, PositionError> {
        *self
    }
}

impl<F> PositionSource for F
where
    F: FnMut() -> Result<PositionSample, PositionError>,
{
    fn current_position(&mut self) -> Result<PositionSample, PositionError> {
        self()
    }
}
