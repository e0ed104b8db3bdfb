// Re-export key components
pub use crate::geodesy::{bearing_degrees, distance_meters, project_onto_segment};
pub use crate::loading::{BuildStats, GraphConfig, build_graph, build_graph_with_stats};
pub use crate::model::{Coordinate, StreetGraph, StreetNode};
pub use crate::navigation::{
    GuidanceHint, Instruction, NavigationConfig, NavigationError, NavigationEvent,
    NavigationSession, NavigationTarget, PositionError, PositionSample, PositionSource,
    RouteSource, SessionState, TurnAction, UpdateOutcome,
};
pub use crate::routing::{Route, shortest_path};

// Core types
pub use crate::Error;
pub use crate::Meters;
pub use crate::NodeId;
