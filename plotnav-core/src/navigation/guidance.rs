//! Relative direction to the target and distance presentation

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    Meters,
    geodesy::{bearing_degrees, normalize_degrees},
    model::Coordinate,
};

/// Bearing to `target` relative to `heading`, in `[0, 360)`
pub fn relative_bearing(position: Coordinate, target: Coordinate, heading: f64) -> f64 {
    normalize_degrees(bearing_degrees(position, target) - heading)
}

/// Eight-way direction to the target relative to where the device faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelativeDirection {
    Straight,
    SlightRight,
    Right,
    SharpRight,
    TurnAround,
    SharpLeft,
    Left,
    SlightLeft,
}

impl RelativeDirection {
    /// Buckets a relative bearing in degrees; 45° wide, centred on the
    /// eight compass points
    pub fn from_relative_bearing(relative: f64) -> Self {
        let relative = normalize_degrees(relative);
        match relative {
            r if r < 22.5 => Self::Straight,
            r if r < 67.5 => Self::SlightRight,
            r if r < 112.5 => Self::Right,
            r if r < 157.5 => Self::SharpRight,
            r if r < 202.5 => Self::TurnAround,
            r if r < 247.5 => Self::SharpLeft,
            r if r < 292.5 => Self::Left,
            r if r < 337.5 => Self::SlightLeft,
            _ => Self::Straight,
        }
    }

    pub fn arrow(self) -> char {
        match self {
            Self::Straight => '↑',
            Self::SlightRight => '↗',
            Self::Right => '→',
            Self::SharpRight => '↘',
            Self::TurnAround => '↓',
            Self::SharpLeft => '↙',
            Self::Left => '←',
            Self::SlightLeft => '↖',
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Straight => "Head straight",
            Self::SlightRight => "Slight right",
            Self::Right => "Turn right",
            Self::SharpRight => "Sharp right",
            Self::TurnAround => "Turn around",
            Self::SharpLeft => "Sharp left",
            Self::Left => "Turn left",
            Self::SlightLeft => "Slight left",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "km")]
    Kilometers,
}

impl DistanceUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Kilometers => "km",
        }
    }
}

/// Distance rounded for display: whole meters below 1 km, tenths of a
/// kilometre above
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayDistance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl From<Meters> for DisplayDistance {
    fn from(meters: Meters) -> Self {
        if meters < 1000.0 {
            Self {
                value: meters.round(),
                unit: DistanceUnit::Meters,
            }
        } else {
            Self {
                value: (meters / 100.0).round() / 10.0,
                unit: DistanceUnit::Kilometers,
            }
        }
    }
}

impl fmt::Display for DisplayDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            DistanceUnit::Meters => write!(f, "{:.0} {}", self.value, self.unit.symbol()),
            DistanceUnit::Kilometers => write!(f, "{:.1} {}", self.value, self.unit.symbol()),
        }
    }
}
