use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::instructions::TurnClassifier;
use crate::{Error, Meters};

/// Navigation session tuning.
///
/// The defaults are empirically tuned values, not correctness requirements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Updates closer together than this are ignored
    pub throttle_interval_ms: u64,
    /// Smoothing factor applied to compass samples
    pub compass_smoothing: f64,
    /// Smoothing factor applied to the GPS course while moving
    pub course_smoothing: f64,
    /// Minimum speed for the GPS course to be trusted
    pub course_min_speed_mps: f64,
    /// How close an instruction's end point must be to be announced
    pub instruction_proximity_m: Meters,
    /// Distance to target that counts as arrival
    pub arrival_radius_m: Meters,
    /// Delay between arrival and automatic stop
    pub arrival_grace_ms: u64,
    /// Turns below this angle are announced as straight
    pub straight_threshold_deg: f64,
    /// Turns at or above this angle are announced as sharp; `None` disables
    pub sharp_turn_threshold_deg: Option<f64>,
    /// Distance from the guidance line that counts as off route
    pub off_route_distance_m: Meters,
    /// Consecutive off-route samples before a new route is computed
    pub off_route_confirmations: u32,
    /// Attempts `start` makes to obtain a first position
    pub start_attempts: u32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            throttle_interval_ms: 1000,
            compass_smoothing: 0.2,
            course_smoothing: 0.3,
            course_min_speed_mps: 1.5,
            instruction_proximity_m: 50.0,
            arrival_radius_m: 5.0,
            arrival_grace_ms: 5000,
            straight_threshold_deg: 15.0,
            sharp_turn_threshold_deg: None,
            off_route_distance_m: 30.0,
            off_route_confirmations: 2,
            start_attempts: 3,
        }
    }
}

impl NavigationConfig {
    pub fn throttle_interval(&self) -> TimeDelta {
        millis(self.throttle_interval_ms)
    }

    pub fn arrival_grace(&self) -> TimeDelta {
        millis(self.arrival_grace_ms)
    }

    pub fn turn_classifier(&self) -> TurnClassifier {
        TurnClassifier {
            straight_deg: self.straight_threshold_deg,
            sharp_deg: self.sharp_turn_threshold_deg,
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first out-of-range field
    pub fn validate(&self) -> Result<(), Error> {
        for (name, factor) in [
            ("compass_smoothing", self.compass_smoothing),
            ("course_smoothing", self.course_smoothing),
        ] {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be in (0, 1], got {factor}"
                )));
            }
        }

        for (name, value) in [
            ("course_min_speed_mps", self.course_min_speed_mps),
            ("instruction_proximity_m", self.instruction_proximity_m),
            ("arrival_radius_m", self.arrival_radius_m),
            ("off_route_distance_m", self.off_route_distance_m),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if !(0.0..180.0).contains(&self.straight_threshold_deg) {
            return Err(Error::InvalidConfig(format!(
                "straight_threshold_deg must be in [0, 180), got {}",
                self.straight_threshold_deg
            )));
        }
        if let Some(sharp) = self.sharp_turn_threshold_deg {
            if !(sharp > self.straight_threshold_deg && sharp <= 180.0) {
                return Err(Error::InvalidConfig(format!(
                    "sharp_turn_threshold_deg must be in (straight_threshold_deg, 180], got {sharp}"
                )));
            }
        }

        if self.off_route_confirmations == 0 {
            return Err(Error::InvalidConfig(
                "off_route_confirmations must be at least 1".to_string(),
            ));
        }
        if self.start_attempts == 0 {
            return Err(Error::InvalidConfig(
                "start_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn millis(ms: u64) -> TimeDelta {
    TimeDelta::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}
