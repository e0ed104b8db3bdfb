//! Shortest paths over the street graph

pub mod dijkstra;
mod route;

pub use dijkstra::shortest_path;
pub use route::Route;
