//! Values returned to the host by a navigation session

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    guidance::{DisplayDistance, RelativeDirection},
    instructions::Instruction,
    position::PositionError,
    session::SessionState,
};
use crate::{Meters, model::Coordinate};

/// Why a direct line was used instead of a graph route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The graph has no nodes to snap to
    EmptyGraph,
    /// Start and target snap into disconnected parts of the graph
    Unreachable,
}

/// Where the current guidance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    Graph,
    /// Degraded service: straight line from position to target
    DirectFallback(FallbackReason),
}

impl RouteSource {
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::DirectFallback(_))
    }
}

/// Next turn, if one is close enough to announce
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceHint {
    Upcoming(Instruction),
    Continue,
}

/// Fired once when the position first comes within the arrival radius
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrivalEvent<M> {
    pub metadata: M,
    pub target: Coordinate,
    pub arrived_at: DateTime<Utc>,
}

/// Guidance produced for one accepted position sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationEvent<M> {
    /// Accepted-sample counter at the time of this event
    pub sequence: u64,
    pub position: Coordinate,
    pub heading: Option<f64>,
    pub distance_remaining: Meters,
    pub display_distance: DisplayDistance,
    pub direction: RelativeDirection,
    pub hint: GuidanceHint,
    pub instruction_text: String,
    pub route_source: RouteSource,
    /// A new route was computed for this sample
    pub rerouted: bool,
    pub arrived: bool,
    /// Present only on the sample that triggered arrival
    pub arrival: Option<ArrivalEvent<M>>,
    pub state: SessionState,
}

impl<M> NavigationEvent<M> {
    pub fn direction_arrow(&self) -> char {
        self.direction.arrow()
    }
}

/// Result of feeding a position sample to the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UpdateOutcome<M> {
    /// Sample arrived within the throttle interval and was ignored
    Throttled,
    /// Position and heading updated; no target is set
    Tracked { sequence: u64, heading: Option<f64> },
    Guidance(NavigationEvent<M>),
    /// The arrival grace period elapsed and the session stopped itself
    Ended,
}

/// Classified position-source failure, for display by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionErrorReport {
    pub error: PositionError,
    pub reason: String,
    /// Session state, unchanged by the failure
    pub state: SessionState,
}
