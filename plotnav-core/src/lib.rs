//! Road-network graph construction, shortest paths and live turn-by-turn
//! navigation over hand-drawn cemetery road geometry.
//!
//! The crate is purely computational: the host supplies road polylines and
//! position samples, and receives graphs, routes and guidance events back.

pub mod error;
pub mod geodesy;
pub mod loading;
pub mod model;
pub mod navigation;
pub mod prelude;
pub mod routing;

pub use error::Error;
pub use loading::{BuildStats, GraphConfig, build_graph, build_graph_with_stats};
pub use model::{Coordinate, StreetEdge, StreetGraph, StreetNode};
pub use routing::{Route, shortest_path};

/// Dense 0-based node identifier, stable for the lifetime of one graph build
pub type NodeId = usize;

/// Distance in meters
pub type Meters = f64;
