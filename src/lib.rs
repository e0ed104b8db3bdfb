//! Host-facing side of the road navigation engine.
//!
//! Reads road polylines from GeoJSON, loads engine settings from TOML and
//! keeps the current street graph behind a swappable [`Arc`] so sessions
//! opened before a rebuild keep the graph they started with.
//!
//! [`Arc`]: std::sync::Arc

pub mod config;
pub mod error;
pub mod geojson;
pub mod network;

pub use crate::config::EngineConfig;
pub use crate::error::Error;
pub use crate::geojson::{CoordinateOrder, read_roads, route_to_feature};
pub use crate::network::RoadNetwork;

pub use plotnav_core::prelude;
