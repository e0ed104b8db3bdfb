//! Turn-by-turn instruction generation

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    Meters,
    geodesy::{bearing_degrees, distance_meters, normalize_signed_degrees},
    model::Coordinate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnAction {
    Straight,
    Left,
    Right,
    SharpLeft,
    SharpRight,
    Arrive,
}

impl TurnAction {
    /// Stable tag, e.g. `"sharp-left"`
    pub fn tag(self) -> &'static str {
        match self {
            Self::Straight => "straight",
            Self::Left => "left",
            Self::Right => "right",
            Self::SharpLeft => "sharp-left",
            Self::SharpRight => "sharp-right",
            Self::Arrive => "arrive",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Straight => "Continue straight",
            Self::Left => "Turn left",
            Self::Right => "Turn right",
            Self::SharpLeft => "Turn sharp left",
            Self::SharpRight => "Turn sharp right",
            Self::Arrive => "Arrive at destination",
        }
    }
}

/// Guidance for one segment of the route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// What to do at the end of the segment
    pub action: TurnAction,
    /// Segment length
    pub distance: Meters,
    /// Segment end point
    pub end: Coordinate,
}

/// Maps a signed turn angle (positive = clockwise) to an action
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnClassifier {
    pub straight_deg: f64,
    pub sharp_deg: Option<f64>,
}

impl Default for TurnClassifier {
    fn default() -> Self {
        Self {
            straight_deg: 15.0,
            sharp_deg: None,
        }
    }
}

impl TurnClassifier {
    pub fn classify(&self, angle: f64) -> TurnAction {
        let magnitude = angle.abs();
        if magnitude < self.straight_deg {
            return TurnAction::Straight;
        }
        let sharp = self.sharp_deg.is_some_and(|sharp| magnitude >= sharp);
        match (angle > 0.0, sharp) {
            (true, false) => TurnAction::Right,
            (true, true) => TurnAction::SharpRight,
            (false, false) => TurnAction::Left,
            (false, true) => TurnAction::SharpLeft,
        }
    }
}

/// Signed turn at `curr`, in `(-180, 180]`; positive turns right
fn turn_angle(prev: Coordinate, curr: Coordinate, next: Coordinate) -> f64 {
    normalize_signed_degrees(bearing_degrees(curr, next) - bearing_degrees(prev, curr))
}

/// One instruction per segment of `route`. The action of a segment is the
/// turn taken at its end; the last segment always arrives.
pub fn generate_instructions(
    route: &[Coordinate],
    classifier: &TurnClassifier,
) -> Vec<Instruction> {
    if route.len() < 2 {
        return Vec::new();
    }

    let mut instructions: Vec<Instruction> = route
        .iter()
        .copied()
        .tuple_windows()
        .map(|(prev, curr, next)| Instruction {
            action: classifier.classify(turn_angle(prev, curr, next)),
            distance: distance_meters(prev, curr),
            end: curr,
        })
        .collect();

    let (prev, last) = (route[route.len() - 2], route[route.len() - 1]);
    instructions.push(Instruction {
        action: TurnAction::Arrive,
        distance: distance_meters(prev, last),
        end: last,
    });

    instructions
}
