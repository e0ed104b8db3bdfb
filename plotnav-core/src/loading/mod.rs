//! This module is responsible for turning independently drawn road
//! polylines into a single routable street graph.

mod builder;
mod config;
mod snapping;

pub use builder::{BuildStats, build_graph, build_graph_with_stats};
pub use config::GraphConfig;
